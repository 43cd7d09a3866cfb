use std::time::Duration;

use crate::{
    audit::{MutationRecord, RunLog},
    config::SkipSwitches,
    github::{RemoteApi, RemoteError},
    store::{StateFile, StoreError},
    types::{Direction, Operation, Plan, PlanEntry, StepOutcome},
    ui,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutorOptions {
    pub skip: SkipSwitches,
    /// Fixed pause after every mutation call.
    pub delay: Duration,
}

/// What happened to one entry during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub id: String,
    /// The name the entry is being moved to in this direction.
    pub target_name: String,
    pub rename: StepOutcome,
    /// Archive step going forward, unarchive step going back.
    pub archive: StepOutcome,
}

impl EntryReport {
    pub fn failed(&self) -> bool {
        self.rename.is_failure() || self.archive.is_failure()
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub direction: Direction,
    pub reports: Vec<EntryReport>,
}

impl RunSummary {
    fn new(direction: Direction) -> Self {
        Self {
            direction,
            reports: Vec::new(),
        }
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| r.failed()).count()
    }

    pub fn applied_steps(&self) -> usize {
        self.reports
            .iter()
            .flat_map(|r| [&r.rename, &r.archive])
            .filter(|s| **s == StepOutcome::Applied)
            .count()
    }
}

/// Drives plan entries through rename → archive, or unarchive → rename-back,
/// saving the whole plan after every entry.
pub struct MutationExecutor<'a, R> {
    api: &'a R,
    plan_file: &'a StateFile,
    log: &'a RunLog,
    options: ExecutorOptions,
}

impl<'a, R: RemoteApi> MutationExecutor<'a, R> {
    pub fn new(
        api: &'a R,
        plan_file: &'a StateFile,
        log: &'a RunLog,
        options: ExecutorOptions,
    ) -> Self {
        Self {
            api,
            plan_file,
            log,
            options,
        }
    }

    /// Per-entry failures are reported and left for the next resume; only a
    /// failure to persist the plan ends the pass early.
    pub async fn apply(&self, plan: &mut Plan) -> Result<RunSummary, StoreError> {
        self.run(plan, Direction::Apply).await
    }

    pub async fn revert(&self, plan: &mut Plan) -> Result<RunSummary, StoreError> {
        self.run(plan, Direction::Revert).await
    }

    async fn run(&self, plan: &mut Plan, direction: Direction) -> Result<RunSummary, StoreError> {
        let mut summary = RunSummary::new(direction);
        for idx in 0..plan.entries.len() {
            let entry = &mut plan.entries[idx];
            let report = match direction {
                Direction::Apply => self.apply_entry(entry).await,
                Direction::Revert => self.revert_entry(entry).await,
            };
            self.plan_file.save(&*plan)?;
            ui::entry_report(direction, &report);
            summary.reports.push(report);
        }
        Ok(summary)
    }

    async fn apply_entry(&self, entry: &mut PlanEntry) -> EntryReport {
        let skip = self.options.skip;

        let rename = if skip.rename || entry.renamed {
            StepOutcome::Skipped
        } else {
            let outcome = match self.api.rename(&entry.id, &entry.new_name).await {
                Ok(name) => confirm_name(&name, &entry.new_name),
                Err(err) => from_remote(err),
            };
            entry.renamed = outcome == StepOutcome::Applied;
            self.after_call(Direction::Apply, entry, Operation::Rename, &outcome)
                .await;
            outcome
        };

        // A skipped rename counts as done; the flag itself is left alone.
        let renamed = skip.rename || entry.renamed;
        let archive = if skip.archive || entry.archived {
            StepOutcome::Skipped
        } else if !renamed {
            StepOutcome::Blocked
        } else {
            let outcome = match self.api.archive(&entry.id).await {
                Ok(archived) => confirm_archived(archived, true),
                Err(err) => from_remote(err),
            };
            entry.archived = outcome == StepOutcome::Applied;
            self.after_call(Direction::Apply, entry, Operation::Archive, &outcome)
                .await;
            outcome
        };

        EntryReport {
            id: entry.id.clone(),
            target_name: entry.new_name.clone(),
            rename,
            archive,
        }
    }

    async fn revert_entry(&self, entry: &mut PlanEntry) -> EntryReport {
        let archive = if entry.archived {
            let outcome = match self.api.unarchive(&entry.id).await {
                Ok(archived) => confirm_archived(archived, false),
                Err(err) => from_remote(err),
            };
            if outcome == StepOutcome::Applied {
                entry.archived = false;
            }
            self.after_call(Direction::Revert, entry, Operation::Unarchive, &outcome)
                .await;
            outcome
        } else {
            StepOutcome::Skipped
        };

        // Rename-back is attempted even when unarchive failed: the two axes
        // are reverted independently.
        let rename = match self.api.rename(&entry.id, &entry.old_name).await {
            Ok(name) => confirm_name(&name, &entry.old_name),
            Err(err) => from_remote(err),
        };
        if rename == StepOutcome::Applied {
            entry.renamed = false;
        }
        self.after_call(Direction::Revert, entry, Operation::Rename, &rename)
            .await;

        EntryReport {
            id: entry.id.clone(),
            target_name: entry.old_name.clone(),
            rename,
            archive,
        }
    }

    async fn after_call(
        &self,
        direction: Direction,
        entry: &PlanEntry,
        operation: Operation,
        outcome: &StepOutcome,
    ) {
        let repo_name = match direction {
            Direction::Apply => &entry.new_name,
            Direction::Revert => &entry.old_name,
        };
        let record = MutationRecord {
            direction,
            repo_id: &entry.id,
            repo_name,
            operation,
            outcome,
        };
        if let Err(err) = self.log.write(record) {
            ui::warn(&format!("run log not written: {err:#}"));
        }
        if !self.options.delay.is_zero() {
            tokio::time::sleep(self.options.delay).await;
        }
    }
}

fn confirm_name(actual: &str, expected: &str) -> StepOutcome {
    if actual == expected {
        StepOutcome::Applied
    } else {
        StepOutcome::Rejected(format!(
            "remote reports name `{actual}`, expected `{expected}`"
        ))
    }
}

fn confirm_archived(actual: bool, expected: bool) -> StepOutcome {
    if actual == expected {
        StepOutcome::Applied
    } else {
        StepOutcome::Rejected(format!("remote reports isArchived = {actual}"))
    }
}

fn from_remote(err: RemoteError) -> StepOutcome {
    match err {
        RemoteError::Rejected(msg) => StepOutcome::Rejected(msg),
        RemoteError::Transport(msg) => StepOutcome::TransportFailure(msg),
    }
}
