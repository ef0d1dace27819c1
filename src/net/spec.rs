//! 网的可序列化描述，以及内置的四库所接力网。
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::net::arc::{Amount, ConsumingArc, ProducingArc};
use crate::net::core::{BuildError, Net};
use crate::net::ids::PlaceId;
use crate::net::place::Place;
use crate::net::token::Color;
use crate::net::transition::{OutputPolicy, Transition};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetSpec {
    #[serde(default)]
    pub places: Vec<PlaceSpec>,
    #[serde(default)]
    pub transitions: Vec<TransitionSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceSpec {
    pub name: String,
    #[serde(default)]
    pub tokens: Vec<Color>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionSpec {
    pub name: String,
    #[serde(default)]
    pub consume: Vec<ArcSpec>,
    #[serde(default)]
    pub produce: Vec<ArcSpec>,
}

/// An arc by place name. A missing `color` means an uncolored arc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcSpec {
    pub place: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default = "default_amount")]
    pub amount: Amount,
}

fn default_amount() -> Amount {
    1
}

impl ArcSpec {
    pub fn colored(place: impl Into<String>, color: impl Into<Color>) -> Self {
        Self {
            place: place.into(),
            color: Some(color.into()),
            amount: 1,
        }
    }
}

impl TransitionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            consume: Vec::new(),
            produce: Vec::new(),
        }
    }

    pub fn consume(mut self, arc: ArcSpec) -> Self {
        self.consume.push(arc);
        self
    }

    pub fn produce(mut self, arc: ArcSpec) -> Self {
        self.produce.push(arc);
        self
    }
}

impl NetSpec {
    /// Places named `P0`, `P1`, ... holding `initial`, with no transitions.
    pub fn from_initial(initial: Vec<Vec<Color>>) -> Self {
        let places = initial
            .into_iter()
            .enumerate()
            .map(|(idx, tokens)| PlaceSpec {
                name: format!("P{idx}"),
                tokens,
            })
            .collect();
        Self {
            places,
            transitions: Vec::new(),
        }
    }

    /// `t1` splits a red and a blue token from P0 into P1 and P2; `t2`
    /// joins them again, sending red on to P3 and blue back to P0.
    pub fn relay(initial: Vec<Vec<Color>>) -> Self {
        let mut spec = Self::from_initial(initial);
        spec.transitions = vec![
            TransitionSpec::new("t1")
                .consume(ArcSpec::colored("P0", "red"))
                .consume(ArcSpec::colored("P0", "blue"))
                .produce(ArcSpec::colored("P1", "red"))
                .produce(ArcSpec::colored("P2", "blue")),
            TransitionSpec::new("t2")
                .consume(ArcSpec::colored("P1", "red"))
                .consume(ArcSpec::colored("P2", "blue"))
                .produce(ArcSpec::colored("P3", "red"))
                .produce(ArcSpec::colored("P0", "blue")),
        ];
        spec
    }

    /// Replaces every place's initial tokens, in place order.
    pub fn with_initial_tokens(mut self, initial: Vec<Vec<Color>>) -> Result<Self, BuildError> {
        if initial.len() != self.places.len() {
            return Err(BuildError::PlaceCountMismatch {
                expected: self.places.len(),
                actual: initial.len(),
            });
        }
        for (place, tokens) in self.places.iter_mut().zip(initial) {
            place.tokens = tokens;
        }
        Ok(self)
    }

    pub fn build(&self, policy: OutputPolicy) -> Result<Net, BuildError> {
        let mut net = Net::empty().with_policy(policy);
        let mut ids: IndexMap<&str, PlaceId> = IndexMap::new();

        for place in &self.places {
            if ids.contains_key(place.name.as_str()) {
                return Err(BuildError::DuplicatePlace(place.name.clone()));
            }
            let id = net.add_place(Place::with_tokens(
                place.name.clone(),
                place.tokens.iter().cloned(),
            ));
            ids.insert(&place.name, id);
        }

        let resolve = |arc: &ArcSpec| {
            ids.get(arc.place.as_str())
                .copied()
                .ok_or_else(|| BuildError::UnknownPlace(arc.place.clone()))
        };

        for spec in &self.transitions {
            let mut transition = Transition::new(spec.name.clone());
            for arc in &spec.consume {
                transition.add_consuming(ConsumingArc::new(resolve(arc)?, arc.color.clone(), arc.amount));
            }
            for arc in &spec.produce {
                transition.add_producing(ProducingArc::new(resolve(arc)?, arc.color.clone(), arc.amount));
            }
            net.insert_transition(transition)?;
        }

        Ok(net)
    }
}
