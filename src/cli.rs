use std::path::PathBuf;

use clap::{Args, Parser};

use crate::{config::Overrides, orchestrator::Mode};

#[derive(Debug, Parser)]
#[command(name = "fork-archiver")]
#[command(
    about = "Rename and archive your forks of an organization's repositories",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub mode: ModeFlags,

    /// TOML file with configuration defaults (environment variables win)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding list.json, modified.json and run_log.jsonl
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Do not issue rename mutations when applying
    #[arg(long)]
    pub skip_rename: bool,

    /// Do not issue archive mutations when applying
    #[arg(long)]
    pub skip_archive: bool,
}

#[derive(Debug, Args)]
#[group(multiple = false)]
pub struct ModeFlags {
    /// Assemble a list of repositories to be modified
    #[arg(long)]
    pub gen_list: bool,

    /// Continue from previous run
    #[arg(long)]
    pub resume: bool,

    /// Reverse modifications
    #[arg(long)]
    pub revert: bool,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        match (self.mode.gen_list, self.mode.resume, self.mode.revert) {
            (true, _, _) => Mode::GenerateList,
            (_, true, _) => Mode::Resume,
            (_, _, true) => Mode::Revert,
            _ => Mode::Default,
        }
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            skip_rename: self.skip_rename,
            skip_archive: self.skip_archive,
            data_dir: self.data_dir.clone(),
        }
    }
}
