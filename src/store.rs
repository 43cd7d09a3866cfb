use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

pub const LIST_FILE_NAME: &str = "list.json";
pub const PLAN_FILE_NAME: &str = "modified.json";
pub const RUN_LOG_FILE_NAME: &str = "run_log.jsonl";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("`{}` not found", path.display())]
    NotFound { path: PathBuf },
    #[error("`{}` does not match the expected schema: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write `{}`", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize state")]
    Serialize(#[from] serde_json::Error),
}

/// A JSON document that is always read and replaced as a whole.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn load<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    path: self.path.clone(),
                });
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Serializes fully, writes a sibling temp file, then renames it over the
    /// target. The old content stays in place until the rename.
    pub fn save<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), StoreError> {
        let mut body = serde_json::to_string_pretty(value)?;
        body.push('\n');

        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let tmp = self.temp_path();
        fs::write(&tmp, body).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(|source| {
            let _ = fs::remove_file(&tmp);
            write_err(source)
        })
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Locations of every file a run reads or writes.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub list: StateFile,
    pub plan: StateFile,
    pub run_log: PathBuf,
}

impl Workspace {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            list: StateFile::new(data_dir.join(LIST_FILE_NAME)),
            plan: StateFile::new(data_dir.join(PLAN_FILE_NAME)),
            run_log: data_dir.join(RUN_LOG_FILE_NAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{StateFile, StoreError, Workspace};
    use crate::types::{Plan, PlanEntry};

    fn sample_plan() -> Plan {
        Plan::new(vec![
            PlanEntry {
                id: "B".into(),
                old_name: "Sprint-Challenge".into(),
                new_name: "zls-Sprint-Challenge".into(),
                renamed: true,
                archived: false,
            },
            PlanEntry {
                id: "A".into(),
                old_name: "Hooks-III".into(),
                new_name: "zls-Hooks-III".into(),
                renamed: false,
                archived: false,
            },
        ])
    }

    #[test]
    fn save_then_load_preserves_order_and_flags() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = StateFile::new(dir.path().join("nested").join("modified.json"));
        let plan = sample_plan();
        file.save(&plan).expect("save");
        let loaded: Plan = file.load().expect("load");
        assert_eq!(loaded, plan);
        assert!(!dir.path().join("nested").join("modified.json.tmp").exists());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = StateFile::new(dir.path().join("modified.json"));
        assert!(!file.exists());
        let err = file.load::<Plan>().expect_err("should fail");
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn wrong_schema_is_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("modified.json");
        std::fs::write(&path, r#"[{"id": "A", "old_name": "x"}]"#).expect("write");
        let err = StateFile::new(&path)
            .load::<Plan>()
            .expect_err("should fail");
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn save_overwrites_previous_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = StateFile::new(dir.path().join("modified.json"));
        file.save(&sample_plan()).expect("first save");
        let mut plan = sample_plan();
        plan.entries.truncate(1);
        file.save(&plan).expect("second save");
        let loaded: Plan = file.load().expect("load");
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn workspace_uses_fixed_file_names() {
        let ws = Workspace::new(std::path::Path::new("data"));
        assert!(ws.list.path().ends_with("list.json"));
        assert!(ws.plan.path().ends_with("modified.json"));
        assert!(ws.run_log.ends_with("run_log.jsonl"));
    }
}
