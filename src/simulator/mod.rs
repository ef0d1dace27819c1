//! 驱动器：按序发生迁移并向 [`Reporter`] 报告每一步。
use log::info;
use thiserror::Error;

use crate::config::SimConfig;
use crate::net::core::{Net, NetError};
use crate::report::{Reporter, RunReport, StepRecord};

pub mod sequence;
pub use sequence::{FixedSequence, RandomSequence, SequenceSource};

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Net(#[from] NetError),
    #[error("failed to write report: {0}")]
    Report(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Simulator {
    pub stop_on_first_forbidden: bool,
}

impl Simulator {
    pub fn new(stop_on_first_forbidden: bool) -> Self {
        Self {
            stop_on_first_forbidden,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.stop_on_first_forbidden)
    }

    /// Fires `plan` in order. An unknown name aborts the run at that step;
    /// steps already taken stay applied.
    pub fn run(
        &self,
        net: &mut Net,
        plan: &[String],
        reporter: &mut dyn Reporter,
    ) -> Result<RunReport, SimError> {
        let initial = net.snapshot();
        reporter.plan(plan, &initial)?;

        let mut steps = Vec::with_capacity(plan.len());
        let mut halted = false;
        for (idx, name) in plan.iter().enumerate() {
            let executed = net.fire(name)?;
            info!(
                "step {}: {} {}",
                idx + 1,
                name,
                if executed { "executed" } else { "forbidden" }
            );
            let step = StepRecord {
                transition: name.clone(),
                executed,
                snapshot: net.snapshot(),
            };
            reporter.step(&step)?;
            steps.push(step);

            if !executed && self.stop_on_first_forbidden {
                info!("halting after forbidden {}, {} step(s) skipped", name, plan.len() - idx - 1);
                halted = true;
                break;
            }
        }

        let enabled_at_end = net
            .enabled_transitions()
            .into_iter()
            .map(|id| net.transitions()[id].name.clone())
            .collect();
        let report = RunReport {
            plan: plan.to_vec(),
            initial,
            steps,
            result: net.snapshot(),
            halted,
            enabled_at_end,
        };
        reporter.finish(&report)?;
        Ok(report)
    }

    pub fn run_source(
        &self,
        net: &mut Net,
        source: &mut dyn SequenceSource,
        reporter: &mut dyn Reporter,
    ) -> Result<RunReport, SimError> {
        let plan = {
            let names: Vec<&str> = net.transition_names().collect();
            source.sequence(&names)
        };
        self.run(net, &plan, reporter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::spec::NetSpec;
    use crate::net::token::Color;
    use crate::net::transition::OutputPolicy;
    use crate::report::Silent;

    fn relay() -> Net {
        NetSpec::relay(vec![
            vec![Color::from("red"), Color::from("blue")],
            vec![],
            vec![],
            vec![],
        ])
        .build(OutputPolicy::Strict)
        .unwrap()
    }

    fn plan(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn continues_past_forbidden_by_default() {
        let mut net = relay();
        let report = Simulator::default()
            .run(&mut net, &plan(&["t2", "t1", "t2"]), &mut Silent)
            .unwrap();
        let outcomes: Vec<bool> = report.steps.iter().map(|step| step.executed).collect();
        assert_eq!(outcomes, vec![false, true, true]);
        assert!(!report.halted);
        assert_eq!(report.result[3], vec![Color::from("red")]);
    }

    #[test]
    fn halts_on_first_forbidden_when_asked() {
        let mut net = relay();
        let report = Simulator::new(true)
            .run(&mut net, &plan(&["t2", "t1", "t2"]), &mut Silent)
            .unwrap();
        assert_eq!(report.steps.len(), 1);
        assert!(report.halted);
        assert_eq!(report.result, report.initial);
        assert_eq!(report.enabled_at_end, vec!["t1".to_string()]);
    }

    #[test]
    fn run_source_draws_from_net_names() {
        let mut net = relay();
        let mut source = RandomSequence::new(6, Some(3));
        let report = Simulator::default()
            .run_source(&mut net, &mut source, &mut Silent)
            .unwrap();
        assert_eq!(report.plan.len(), 6);
        assert!(report.plan.iter().all(|name| name == "t1" || name == "t2"));
    }
}
