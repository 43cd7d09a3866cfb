pub mod symbols;

use std::io::{self, BufRead, Write};

use anyhow::Result;
use crossterm::style::Stylize;
use unicode_width::UnicodeWidthStr;

use crate::{
    executor::{EntryReport, RunSummary},
    types::{Candidate, Direction, StepOutcome},
};
use symbols::Symbols;

const NAME_COLUMN_MAX: usize = 40;

// ── Prompts ───────────────────────────────────────────────────────────────────

/// Yes/no questions put to the operator.
pub trait Prompter {
    fn confirm(&mut self, message: &str) -> Result<bool>;
}

impl<T: Prompter + ?Sized> Prompter for &mut T {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        (**self).confirm(message)
    }
}

/// Reads one line from stdin per question. EOF answers "no".
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        let sym = Symbols::current();
        let mut stdout = io::stdout();
        write!(stdout, "{} {message} (y/n): ", sym.prompt.cyan())?;
        stdout.flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        Ok(read > 0 && is_yes(&line))
    }
}

/// Only the first word counts, so "y please" is a yes and "yy" is not.
pub fn is_yes(answer: &str) -> bool {
    answer
        .split_whitespace()
        .next()
        .is_some_and(|word| word.eq_ignore_ascii_case("y") || word.eq_ignore_ascii_case("yes"))
}

// ── Output ────────────────────────────────────────────────────────────────────

pub fn info(msg: &str) {
    println!("{msg}");
}

pub fn success(msg: &str) {
    println!("{} {}", Symbols::current().check.green(), msg);
}

pub fn warn(msg: &str) {
    eprintln!("{} {}", Symbols::current().warning.yellow(), msg.yellow());
}

pub fn error(msg: &str) {
    eprintln!("{} {}", Symbols::current().cross.red(), msg.red());
}

pub fn candidate_found(candidate: &Candidate) {
    let sym = Symbols::current();
    println!(
        "  {} {}  {}",
        sym.bullet,
        pad_to_width(&candidate.name, NAME_COLUMN_MAX),
        candidate.url.as_str().dark_grey()
    );
}

pub fn entry_report(direction: Direction, report: &EntryReport) {
    let sym = Symbols::current();
    let untouched = report.rename == StepOutcome::Skipped && report.archive == StepOutcome::Skipped;
    let mark = if report.failed() {
        sym.cross.red().to_string()
    } else if untouched {
        sym.skip.dark_grey().to_string()
    } else {
        sym.check.green().to_string()
    };
    let archive_label = match direction {
        Direction::Apply => "archive",
        Direction::Revert => "unarchive",
    };
    println!(
        "{mark} {} {} {}  rename: {}  {archive_label}: {}",
        report.id.as_str().dark_grey(),
        sym.arrow_right,
        pad_to_width(&report.target_name, NAME_COLUMN_MAX),
        styled_outcome(&report.rename),
        styled_outcome(&report.archive),
    );
    for detail in [report.rename.detail(), report.archive.detail()]
        .into_iter()
        .flatten()
    {
        println!("    {}", detail.dark_grey());
    }
}

pub fn run_summary(summary: &RunSummary) {
    let verb = match summary.direction {
        Direction::Apply => "Modification",
        Direction::Revert => "Revert",
    };
    let failed = summary.failed();
    let line = format!(
        "{verb} pass finished: {} repositories, {} mutations confirmed, {failed} with failures.",
        summary.reports.len(),
        summary.applied_steps(),
    );
    if failed == 0 {
        success(&line);
    } else {
        warn(&line);
        warn("Run again with --resume (or --revert) to retry the failed repositories.");
    }
}

fn styled_outcome(outcome: &StepOutcome) -> String {
    let status = outcome.as_status();
    match outcome {
        StepOutcome::Applied => status.green().to_string(),
        StepOutcome::Skipped => status.dark_grey().to_string(),
        StepOutcome::Blocked => status.yellow().to_string(),
        StepOutcome::Rejected(_) | StepOutcome::TransportFailure(_) => status.red().to_string(),
    }
}

fn pad_to_width(text: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(text);
    if w >= width {
        return text.to_string();
    }
    format!("{text}{}", " ".repeat(width - w))
}
