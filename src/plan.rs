use std::collections::HashSet;

use thiserror::Error;

use crate::types::{Candidate, Plan, PlanEntry};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("candidate #{index} has an empty `{field}`")]
    EmptyField { index: usize, field: &'static str },
    #[error("repository id `{0}` appears more than once")]
    DuplicateId(String),
}

/// One fresh entry per candidate, in candidate order.
pub fn build_plan(candidates: &[Candidate], prefix: &str) -> Result<Plan, PlanError> {
    let mut seen = HashSet::with_capacity(candidates.len());
    let mut entries = Vec::with_capacity(candidates.len());
    for (index, candidate) in candidates.iter().enumerate() {
        if candidate.id.trim().is_empty() {
            return Err(PlanError::EmptyField { index, field: "id" });
        }
        if candidate.name.trim().is_empty() {
            return Err(PlanError::EmptyField {
                index,
                field: "name",
            });
        }
        if !seen.insert(candidate.id.as_str()) {
            return Err(PlanError::DuplicateId(candidate.id.clone()));
        }
        entries.push(PlanEntry {
            id: candidate.id.clone(),
            old_name: candidate.name.clone(),
            new_name: format!("{prefix}{}", candidate.name),
            renamed: false,
            archived: false,
        });
    }
    Ok(Plan::new(entries))
}

#[cfg(test)]
mod tests {
    use super::{PlanError, build_plan};
    use crate::types::{Candidate, PlanEntry};

    fn candidate(id: &str, name: &str) -> Candidate {
        Candidate {
            id: id.to_string(),
            name: name.to_string(),
            url: String::new(),
            owner_login: "alice".to_string(),
            parent_owner_id: "ORG1".to_string(),
            parent_owner_login: String::new(),
        }
    }

    #[test]
    fn prefixes_names_and_clears_flags() {
        let plan = build_plan(&[candidate("A", "Hooks-III")], "zls-").expect("plan");
        assert_eq!(
            plan.entries,
            vec![PlanEntry {
                id: "A".into(),
                old_name: "Hooks-III".into(),
                new_name: "zls-Hooks-III".into(),
                renamed: false,
                archived: false,
            }]
        );
    }

    #[test]
    fn keeps_candidate_order() {
        let plan = build_plan(
            &[candidate("C", "c"), candidate("A", "a"), candidate("B", "b")],
            "x-",
        )
        .expect("plan");
        let ids: Vec<&str> = plan.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = build_plan(&[candidate("A", "a"), candidate("B", " ")], "x-")
            .expect_err("should fail");
        assert_eq!(
            err,
            PlanError::EmptyField {
                index: 1,
                field: "name"
            }
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = build_plan(&[candidate("A", "a"), candidate("A", "b")], "x-")
            .expect_err("should fail");
        assert_eq!(err, PlanError::DuplicateId("A".into()));
    }

    #[test]
    fn missing_fields_in_list_file_fail_to_decode() {
        let raw = r#"[{ "id": "A", "owner_login": "alice", "parent_owner_id": "ORG1" }]"#;
        assert!(serde_json::from_str::<Vec<Candidate>>(raw).is_err());
    }
}
