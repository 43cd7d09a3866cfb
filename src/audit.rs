use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

use anyhow::{Context, Result};
use chrono::Local;
use serde_json::json;

use crate::types::{Direction, Operation, StepOutcome};

const DETAIL_LIMIT_CHARS: usize = 400;

/// Append-only JSONL record of every mutation attempt.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
    run_id: String,
}

#[derive(Debug, Clone)]
pub struct MutationRecord<'a> {
    pub direction: Direction,
    pub repo_id: &'a str,
    pub repo_name: &'a str,
    pub operation: Operation,
    pub outcome: &'a StepOutcome,
}

impl RunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let run_id = format!("run-{}", Local::now().format("%Y%m%d-%H%M%S"));
        Self {
            path: path.into(),
            run_id,
        }
    }

    pub fn write(&self, rec: MutationRecord<'_>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open `{}`", self.path.display()))?;

        let line = json!({
            "ts": Local::now().to_rfc3339(),
            "run_id": self.run_id,
            "direction": rec.direction.as_str(),
            "repo_id": rec.repo_id,
            "repo_name": rec.repo_name,
            "operation": rec.operation.as_str(),
            "status": rec.outcome.as_status(),
            "detail": rec.outcome.detail().map(|d| truncate_chars(d, DETAIL_LIMIT_CHARS)),
        });

        writeln!(file, "{line}")?;
        Ok(())
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(13);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("…(truncated)");
    out
}
