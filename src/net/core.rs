//! 运行时: 着色网的构造、按名发生与连通性诊断.
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::net::arc::{Amount, ArcColor, ConsumingArc, ProducingArc};
use crate::net::ids::{PlaceId, TransitionId};
use crate::net::index_vec::{Idx, IndexVec};
use crate::net::place::{Place, TokenNotFound};
use crate::net::token::Color;
use crate::net::transition::{OutputPolicy, Transition};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FireError {
    #[error("transition `{transition}` references {place}, which is not in the net")]
    UnknownPlace {
        transition: String,
        place: PlaceId,
    },
    #[error(
        "transition `{transition}` cannot deliver {wanted} token(s) of `{color}` to {place}: only {available} consumed"
    )]
    UnmatchedOutput {
        transition: String,
        place: PlaceId,
        color: ArcColor,
        wanted: Amount,
        available: usize,
    },
    #[error("transition `{transition}` broke its guard invariant")]
    TokenNotFound {
        transition: String,
        #[source]
        source: TokenNotFound,
    },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("transition `{0}` is defined twice")]
    DuplicateTransition(String),
    #[error("place `{0}` is defined twice")]
    DuplicatePlace(String),
    #[error("no place named `{0}`")]
    UnknownPlace(String),
    #[error("{place} is out of bounds for a net with {places} place(s)")]
    PlaceOutOfBounds { place: PlaceId, places: usize },
    #[error("{0:?} is out of bounds")]
    TransitionOutOfBounds(TransitionId),
    #[error("arc between `{transition}` and {place} has amount 0")]
    ZeroAmount { transition: String, place: PlaceId },
    #[error("net has {expected} place(s) but {actual} initial specification(s) were given")]
    PlaceCountMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum NetError {
    #[error("unknown transition `{0}`")]
    UnknownTransition(String),
    #[error(transparent)]
    Fire(#[from] FireError),
}

/// 着色网连通性诊断报告
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiagnosticReport {
    /// 孤立库所（无任何连接的弧）
    pub isolated_places: Vec<(PlaceId, String)>,
    /// 无消耗弧的迁移（总是可发生）
    pub sourceless_transitions: Vec<(TransitionId, String)>,
    /// 产出颜色无法由同一迁移的消耗弧提供
    pub unmatched_outputs: Vec<(TransitionId, String, ArcColor)>,
    pub total_places: usize,
    pub total_transitions: usize,
}

impl DiagnosticReport {
    pub fn has_issues(&self) -> bool {
        !self.isolated_places.is_empty()
            || !self.sourceless_transitions.is_empty()
            || !self.unmatched_outputs.is_empty()
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        use std::io::Write;
        let mut file = fs::File::create(path)?;

        writeln!(
            file,
            "{} place(s), {} transition(s)",
            self.total_places, self.total_transitions
        )?;
        for (id, name) in &self.isolated_places {
            writeln!(file, "isolated place [{}] {}", id.index(), name)?;
        }
        for (id, name) in &self.sourceless_transitions {
            writeln!(file, "transition without inputs [{}] {}", id.index(), name)?;
        }
        for (id, name, color) in &self.unmatched_outputs {
            writeln!(
                file,
                "transition [{}] {} produces `{}` but consumes none",
                id.index(),
                name,
                color
            )?;
        }
        Ok(())
    }
}

/// A fixed set of places and the transitions wired to them.
///
/// Places live in an arena; transitions refer to them only by [`PlaceId`].
#[derive(Clone, Debug, Serialize)]
pub struct Net {
    places: IndexVec<PlaceId, Place>,
    transitions: IndexVec<TransitionId, Transition>,
    #[serde(skip)]
    by_name: IndexMap<String, TransitionId>,
    policy: OutputPolicy,
}

impl Net {
    pub fn empty() -> Self {
        Self {
            places: IndexVec::new(),
            transitions: IndexVec::new(),
            by_name: IndexMap::new(),
            policy: OutputPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: OutputPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn add_place(&mut self, place: Place) -> PlaceId {
        self.places.push(place)
    }

    pub fn add_transition(&mut self, name: impl Into<String>) -> Result<TransitionId, BuildError> {
        self.insert_transition(Transition::new(name))
    }

    /// Registers a fully wired transition, validating every arc.
    pub fn insert_transition(&mut self, transition: Transition) -> Result<TransitionId, BuildError> {
        if self.by_name.contains_key(&transition.name) {
            return Err(BuildError::DuplicateTransition(transition.name));
        }
        for arc in transition.consuming_arcs() {
            self.check_arc(&transition.name, arc.place, arc.amount)?;
        }
        for arc in transition.producing_arcs() {
            self.check_arc(&transition.name, arc.place, arc.amount)?;
        }
        let name = transition.name.clone();
        let id = self.transitions.push(transition);
        self.by_name.insert(name, id);
        Ok(id)
    }

    /// 输入弧: place -> transition
    pub fn add_input_arc(
        &mut self,
        transition: TransitionId,
        place: PlaceId,
        color: impl Into<ArcColor>,
        amount: Amount,
    ) -> Result<(), BuildError> {
        let name = self.transition_name(transition)?;
        self.check_arc(&name, place, amount)?;
        self.transitions[transition].add_consuming(ConsumingArc::new(place, color, amount));
        Ok(())
    }

    /// 输出弧: transition -> place
    pub fn add_output_arc(
        &mut self,
        transition: TransitionId,
        place: PlaceId,
        color: impl Into<ArcColor>,
        amount: Amount,
    ) -> Result<(), BuildError> {
        let name = self.transition_name(transition)?;
        self.check_arc(&name, place, amount)?;
        self.transitions[transition].add_producing(ProducingArc::new(place, color, amount));
        Ok(())
    }

    fn transition_name(&self, transition: TransitionId) -> Result<String, BuildError> {
        self.transitions
            .get(transition)
            .map(|t| t.name.clone())
            .ok_or(BuildError::TransitionOutOfBounds(transition))
    }

    fn check_arc(&self, transition: &str, place: PlaceId, amount: Amount) -> Result<(), BuildError> {
        if !self.places.contains_id(place) {
            return Err(BuildError::PlaceOutOfBounds {
                place,
                places: self.places.len(),
            });
        }
        if amount == 0 {
            return Err(BuildError::ZeroAmount {
                transition: transition.to_string(),
                place,
            });
        }
        Ok(())
    }

    pub fn place(&self, place: PlaceId) -> Option<&Place> {
        self.places.get(place)
    }

    pub fn places(&self) -> &IndexVec<PlaceId, Place> {
        &self.places
    }

    pub fn transitions(&self) -> &IndexVec<TransitionId, Transition> {
        &self.transitions
    }

    pub fn transition_id(&self, name: &str) -> Option<TransitionId> {
        self.by_name.get(name).copied()
    }

    pub fn transition_names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn places_len(&self) -> usize {
        self.places.len()
    }

    pub fn transitions_len(&self) -> usize {
        self.transitions.len()
    }

    /// Token colors of every place, in place construction order.
    pub fn snapshot(&self) -> Vec<Vec<Color>> {
        self.places.iter().map(Place::snapshot).collect()
    }

    pub fn total_tokens(&self) -> usize {
        self.places.iter().map(Place::contains).sum()
    }

    pub fn fire(&mut self, name: &str) -> Result<bool, NetError> {
        let id = self
            .transition_id(name)
            .ok_or_else(|| NetError::UnknownTransition(name.to_string()))?;
        self.fire_id(id)
    }

    pub fn fire_id(&mut self, transition: TransitionId) -> Result<bool, NetError> {
        let Some(target) = self.transitions.get_mut(transition) else {
            return Err(NetError::UnknownTransition(transition.to_string()));
        };
        Ok(target.fire(&mut self.places, self.policy)?)
    }

    pub fn is_enabled(&self, transition: TransitionId) -> bool {
        self.transitions
            .get(transition)
            .is_some_and(|t| t.is_enabled(&self.places))
    }

    pub fn enabled_transitions(&self) -> Vec<TransitionId> {
        self.transitions
            .iter_enumerated()
            .filter(|(_, transition)| transition.is_enabled(&self.places))
            .map(|(id, _)| id)
            .collect()
    }

    /// 诊断信息：孤立库所、无输入迁移以及静态不可满足的产出弧
    pub fn diagnose_connectivity(&self) -> DiagnosticReport {
        let isolated_places = self
            .places
            .iter_enumerated()
            .filter(|(id, _)| !self.transitions.iter().any(|t| t.involves(*id)))
            .map(|(id, place)| (id, place.name.clone()))
            .collect();

        let mut sourceless_transitions = Vec::new();
        let mut unmatched_outputs = Vec::new();
        for (id, transition) in self.transitions.iter_enumerated() {
            let inputs = transition.consuming_arcs();
            if inputs.is_empty() {
                sourceless_transitions.push((id, transition.name.clone()));
            }
            let has_uncolored_input = inputs.iter().any(|arc| arc.color == ArcColor::Any);
            let input_colors: BTreeSet<&Color> =
                inputs.iter().filter_map(|arc| arc.color.as_color()).collect();
            for arc in transition.producing_arcs() {
                let supplied = match &arc.color {
                    ArcColor::Any => !inputs.is_empty(),
                    ArcColor::Color(color) => has_uncolored_input || input_colors.contains(color),
                };
                if !supplied {
                    unmatched_outputs.push((id, transition.name.clone(), arc.color.clone()));
                }
            }
        }

        DiagnosticReport {
            isolated_places,
            sourceless_transitions,
            unmatched_outputs,
            total_places: self.places_len(),
            total_transitions: self.transitions_len(),
        }
    }

    pub fn log_diagnostics(&self) {
        let report = self.diagnose_connectivity();

        if report.has_issues() {
            log::warn!(
                "net has {} place(s), {} transition(s)",
                report.total_places,
                report.total_transitions
            );
            for (id, name) in &report.isolated_places {
                log::warn!("  - isolated place [{}] {}", id.index(), name);
            }
            for (id, name) in &report.sourceless_transitions {
                log::warn!("  - transition [{}] {} has no consuming arc", id.index(), name);
            }
            for (id, name, color) in &report.unmatched_outputs {
                log::warn!(
                    "  - transition [{}] {} produces `{}` that none of its inputs supply",
                    id.index(),
                    name,
                    color
                );
            }
        } else {
            log::info!("net connectivity check passed");
        }
    }
}

impl Default for Net {
    fn default() -> Self {
        Self::empty()
    }
}
