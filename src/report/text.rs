use std::io::{self, Write};

use itertools::Itertools;

use super::{Reporter, RunReport, StepRecord, format_snapshot};
use crate::net::token::Color;

/// Console layout:
///
/// ```text
/// Execution plan: t1 => t2
/// Initial state:  [[red, blue], [], [], []]
///
/// t1 executed
///     [[], [red], [blue], []]
/// t2 forbidden
///
/// result [[], [red], [blue], []]
/// ```
pub struct TextReporter<W: Write> {
    out: W,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TextReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn plan(&mut self, plan: &[String], initial: &[Vec<Color>]) -> io::Result<()> {
        writeln!(self.out, "Execution plan: {}", plan.iter().join(" => "))?;
        writeln!(self.out, "Initial state:  {}", format_snapshot(initial))?;
        writeln!(self.out)
    }

    fn step(&mut self, step: &StepRecord) -> io::Result<()> {
        if step.executed {
            writeln!(self.out, "{} executed", step.transition)?;
            writeln!(self.out, "    {}", format_snapshot(&step.snapshot))
        } else {
            writeln!(self.out, "{} forbidden", step.transition)
        }
    }

    fn finish(&mut self, report: &RunReport) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "result {}", format_snapshot(&report.result))?;
        self.out.flush()
    }
}
