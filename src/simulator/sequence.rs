//! 执行序列来源：固定序列或随机抽取。
use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

/// Supplies the ordered transition names a run will attempt.
pub trait SequenceSource {
    fn sequence(&mut self, names: &[&str]) -> Vec<String>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedSequence(pub Vec<String>);

impl FixedSequence {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self(names.into_iter().map(Into::into).collect())
    }
}

impl SequenceSource for FixedSequence {
    fn sequence(&mut self, _names: &[&str]) -> Vec<String> {
        self.0.clone()
    }
}

/// Draws `length` names uniformly, with replacement.
pub struct RandomSequence {
    length: usize,
    rng: StdRng,
}

impl RandomSequence {
    pub fn new(length: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { length, rng }
    }
}

impl SequenceSource for RandomSequence {
    fn sequence(&mut self, names: &[&str]) -> Vec<String> {
        let drawn: Vec<String> = (0..self.length)
            .filter_map(|_| names.choose(&mut self.rng))
            .map(|name| name.to_string())
            .collect();
        debug!("drew {} of {} requested transition(s)", drawn.len(), self.length);
        drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_sequence_ignores_available_names() {
        let mut source = FixedSequence::new(["t2", "t1"]);
        assert_eq!(source.sequence(&["t1"]), vec!["t2".to_string(), "t1".to_string()]);
    }

    #[test]
    fn seeded_random_sequence_is_reproducible() {
        let names = ["t1", "t2", "t3"];
        let first = RandomSequence::new(20, Some(7)).sequence(&names);
        let second = RandomSequence::new(20, Some(7)).sequence(&names);
        assert_eq!(first.len(), 20);
        assert_eq!(first, second);
        assert!(first.iter().all(|name| names.contains(&name.as_str())));
    }

    #[test]
    fn random_sequence_over_no_names_is_empty() {
        assert!(RandomSequence::new(5, Some(1)).sequence(&[]).is_empty());
    }
}
