use anyhow::{Context, Result};

use crate::{
    audit::RunLog,
    config::Config,
    discovery::{ForkFilter, discover},
    executor::{ExecutorOptions, MutationExecutor, RunSummary},
    github::RemoteApi,
    plan::build_plan,
    store::Workspace,
    types::{Candidate, Plan},
    ui::{self, Prompter},
};

/// Which entry point the operator asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    GenerateList,
    Resume,
    Revert,
    Default,
}

#[derive(Debug)]
pub enum ListOutcome {
    Generated(usize),
    /// The operator kept the existing list file.
    Kept,
}

#[derive(Debug)]
pub enum RunOutcome {
    Listed(ListOutcome),
    /// The operator declined at a confirmation prompt; nothing was modified.
    Declined,
    Executed(RunSummary),
}

pub struct Orchestrator<'a, R, P> {
    config: &'a Config,
    api: &'a R,
    prompter: P,
    workspace: Workspace,
    log: RunLog,
}

impl<'a, R: RemoteApi, P: Prompter> Orchestrator<'a, R, P> {
    pub fn new(config: &'a Config, api: &'a R, prompter: P) -> Self {
        let workspace = Workspace::new(&config.data_dir);
        let log = RunLog::new(workspace.run_log.clone());
        Self {
            config,
            api,
            prompter,
            workspace,
            log,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub async fn run(&mut self, mode: Mode) -> Result<RunOutcome> {
        match mode {
            Mode::GenerateList => Ok(RunOutcome::Listed(self.generate_list().await?)),
            Mode::Resume => self.resume().await.map(RunOutcome::Executed),
            Mode::Revert => self.revert().await.map(RunOutcome::Executed),
            Mode::Default => self.default_run().await,
        }
    }

    pub async fn generate_list(&mut self) -> Result<ListOutcome> {
        ui::info("List generation starting...");
        let list = &self.workspace.list;
        if list.exists()
            && !self
                .prompter
                .confirm("Found previously generated list, overwrite?")?
        {
            ui::info("List generation skipped.");
            return Ok(ListOutcome::Kept);
        }

        let filter = ForkFilter {
            org_id: self.config.source_org_id.clone(),
            username: self.config.username.clone(),
        };
        let candidates = discover(self.api, &filter, ui::candidate_found)
            .await
            .context("repository discovery failed")?;
        list.save(&candidates)
            .context("failed to save the repository list")?;

        ui::info(&format!("\nTotal repositories found: {}\n", candidates.len()));
        ui::success(&format!(
            "List generation complete. Verify and make any necessary changes to the repositories in {}",
            list.path().display()
        ));
        Ok(ListOutcome::Generated(candidates.len()))
    }

    /// Builds a fresh plan from the list file and saves it, replacing any
    /// existing plan.
    pub fn create_plan(&self) -> Result<Plan> {
        ui::info("Creating modification progress file...");
        let candidates: Vec<Candidate> = self
            .workspace
            .list
            .load()
            .context("failed to load the repository list")?;
        let plan = build_plan(&candidates, &self.config.prefix)
            .with_context(|| format!("invalid entry in {}", self.workspace.list.path().display()))?;
        self.workspace
            .plan
            .save(&plan)
            .context("failed to save the plan")?;
        ui::info(&format!("Total repositories to modify: {}", plan.len()));
        if plan.is_empty() {
            ui::warn("The repository list is empty; nothing will be modified.");
        }
        Ok(plan)
    }

    pub async fn resume(&mut self) -> Result<RunSummary> {
        let mut plan = self.load_plan("resume")?;
        ui::info(&format!(
            "Using {} to edit repositories ({} of {} pending)...",
            self.workspace.plan.path().display(),
            plan.pending_apply(),
            plan.len()
        ));
        let summary = self.executor().apply(&mut plan).await?;
        ui::run_summary(&summary);
        Ok(summary)
    }

    pub async fn revert(&mut self) -> Result<RunSummary> {
        let mut plan = self.load_plan("revert")?;
        ui::info(&format!(
            "Using {} to revert changes ({} of {} to undo)...",
            self.workspace.plan.path().display(),
            plan.pending_revert(),
            plan.len()
        ));
        let summary = self.executor().revert(&mut plan).await?;
        ui::run_summary(&summary);
        Ok(summary)
    }

    /// Discovery, confirmation, plan build, then a forward pass.
    pub async fn full_run(&mut self) -> Result<RunOutcome> {
        self.generate_list().await?;
        if !self.prompter.confirm("Continue with modification?")? {
            return Ok(RunOutcome::Declined);
        }
        let mut plan = self.create_plan()?;
        let summary = self.executor().apply(&mut plan).await?;
        ui::run_summary(&summary);
        Ok(RunOutcome::Executed(summary))
    }

    async fn default_run(&mut self) -> Result<RunOutcome> {
        if !self.workspace.plan.exists() {
            return self.full_run().await;
        }
        let file_name = self.workspace.plan.path().display().to_string();
        if self
            .prompter
            .confirm(&format!("{file_name} found. Resume from there?"))?
        {
            return self.resume().await.map(RunOutcome::Executed);
        }
        ui::warn(&format!(
            "Overwriting {file_name} is NOT recommended, only go forward if you know what you are doing."
        ));
        if self.prompter.confirm("Continue?")? {
            self.full_run().await
        } else {
            Ok(RunOutcome::Declined)
        }
    }

    fn load_plan(&self, action: &str) -> Result<Plan> {
        self.workspace
            .plan
            .load()
            .with_context(|| format!("nothing to {action}"))
    }

    fn executor(&self) -> MutationExecutor<'_, R> {
        MutationExecutor::new(
            self.api,
            &self.workspace.plan,
            &self.log,
            ExecutorOptions {
                skip: self.config.skip,
                delay: self.config.mutation_delay,
            },
        )
    }
}
