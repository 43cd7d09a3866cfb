use serde::{Deserialize, Serialize};

/// A fork returned by discovery. Written to `list.json` so the operator can
/// prune it before a plan is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: String,
    pub owner_login: String,
    pub parent_owner_id: String,
    #[serde(default)]
    pub parent_owner_login: String,
}

/// One repository's rename/archive progress.
///
/// `renamed` and `archived` are latches for the direction currently being
/// driven: forward wants both true, reverse wants both false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub id: String,
    pub old_name: String,
    pub new_name: String,
    pub renamed: bool,
    pub archived: bool,
}

impl PlanEntry {
    pub fn is_applied(&self) -> bool {
        self.renamed && self.archived
    }

    pub fn is_reverted(&self) -> bool {
        !self.renamed && !self.archived
    }
}

/// Ordered plan entries; a bare JSON array on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan {
    pub entries: Vec<PlanEntry>,
}

impl Plan {
    pub fn new(entries: Vec<PlanEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending_apply(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_applied()).count()
    }

    pub fn pending_revert(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_reverted()).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Apply,
    Revert,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Apply => "apply",
            Self::Revert => "revert",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Rename,
    Archive,
    Unarchive,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rename => "rename",
            Self::Archive => "archive",
            Self::Unarchive => "unarchive",
        }
    }
}

/// Result of one step of an entry's cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The mutation was issued and the remote confirmed the expected state.
    Applied,
    /// Latched already, or disabled by a skip switch.
    Skipped,
    /// Not attempted because an earlier step of the same entry failed.
    Blocked,
    /// The remote answered without confirming the expected state.
    Rejected(String),
    /// The call did not complete.
    TransportFailure(String),
}

impl StepOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Rejected(_) | Self::TransportFailure(_))
    }

    pub fn as_status(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Skipped => "skipped",
            Self::Blocked => "blocked",
            Self::Rejected(_) => "rejected",
            Self::TransportFailure(_) => "transport_failure",
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Rejected(d) | Self::TransportFailure(d) => Some(d),
            _ => None,
        }
    }
}
