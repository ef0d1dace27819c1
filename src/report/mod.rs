use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};

use itertools::Itertools;

use crate::net::token::Color;

pub mod text;
pub use text::TextReporter;

/// Token colors of every place, in place construction order.
pub type Snapshot = Vec<Vec<Color>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub transition: String,
    pub executed: bool,
    pub snapshot: Snapshot, // 本步之后的状态
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub plan: Vec<String>,
    pub initial: Snapshot,
    pub steps: Vec<StepRecord>,
    pub result: Snapshot,
    pub halted: bool, // 因首次禁止发生而提前停止
    pub enabled_at_end: Vec<String>,
}

impl RunReport {
    pub fn executed(&self) -> usize {
        self.steps.iter().filter(|step| step.executed).count()
    }

    pub fn forbidden(&self) -> usize {
        self.steps.len() - self.executed()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "plan: {}", self.plan.iter().join(" => "))?;
        writeln!(
            f,
            "{} step(s): {} executed, {} forbidden{}",
            self.steps.len(),
            self.executed(),
            self.forbidden(),
            if self.halted { ", halted" } else { "" }
        )?;
        writeln!(f, "result {}", format_snapshot(&self.result))?;
        if !self.enabled_at_end.is_empty() {
            writeln!(f, "enabled: {}", self.enabled_at_end.iter().join(", "))?;
        }
        Ok(())
    }
}

/// `[[red, blue], [], [green]]`
pub fn format_snapshot(snapshot: &[Vec<Color>]) -> String {
    format!(
        "[{}]",
        snapshot
            .iter()
            .map(|place| format!("[{}]", place.iter().join(", ")))
            .join(", ")
    )
}

/// Receives the progress of one run.
pub trait Reporter {
    fn plan(&mut self, plan: &[String], initial: &[Vec<Color>]) -> io::Result<()>;
    fn step(&mut self, step: &StepRecord) -> io::Result<()>;
    fn finish(&mut self, report: &RunReport) -> io::Result<()>;
}

/// Discards everything; the returned [`RunReport`] still carries the run.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Reporter for Silent {
    fn plan(&mut self, _plan: &[String], _initial: &[Vec<Color>]) -> io::Result<()> {
        Ok(())
    }

    fn step(&mut self, _step: &StepRecord) -> io::Result<()> {
        Ok(())
    }

    fn finish(&mut self, _report: &RunReport) -> io::Result<()> {
        Ok(())
    }
}

/// Writes the whole [`RunReport`] as JSON once the run is over.
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn plan(&mut self, _plan: &[String], _initial: &[Vec<Color>]) -> io::Result<()> {
        Ok(())
    }

    fn step(&mut self, _step: &StepRecord) -> io::Result<()> {
        Ok(())
    }

    fn finish(&mut self, report: &RunReport) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, report)?;
        writeln!(self.out)
    }
}
