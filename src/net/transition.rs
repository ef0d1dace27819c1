//! 迁移：守卫 → 消耗 → 产出 的原子发生过程。
//!
//! 一次发生分为三个阶段：
//! 1. 守卫阶段：逐弧检查 `is_satisfied`，并在库所快照上演练全部消耗，
//!    保证多条弧作用于同一库所时结果与弧的顺序无关；
//! 2. 消耗阶段：按计划调用 `take`，托肯进入工作缓冲区；
//! 3. 产出阶段：着色产出弧先于无色产出弧，各自按声明顺序认领缓冲区中
//!    颜色匹配的托肯。
//!
//! 守卫失败时不修改任何库所；缓冲区在每次调用前后均为空。
use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::net::arc::{ArcColor, ConsumingArc, ProducingArc};
use crate::net::core::FireError;
use crate::net::ids::PlaceId;
use crate::net::index_vec::IndexVec;
use crate::net::place::Place;
use crate::net::token::{Color, Token};

type ArcList<A> = SmallVec<[A; 4]>;

/// What happens to a producing arc that finds no matching buffered token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputPolicy {
    /// Refuse the firing before any place is touched.
    #[default]
    Strict,
    /// Skip the arc and commit the rest.
    Drop,
}

#[derive(Clone, Debug, Serialize)]
pub struct Transition {
    pub name: String,
    consuming: ArcList<ConsumingArc>,
    producing: ArcList<ProducingArc>,
    #[serde(skip)]
    buffer: Vec<Token>,
}

/// Buffer slots claimed by each producing arc, indexed like `producing`.
type OutputPlan = Vec<Vec<usize>>;

impl Transition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            consuming: ArcList::new(),
            producing: ArcList::new(),
            buffer: Vec::new(),
        }
    }

    pub fn consume(mut self, arc: ConsumingArc) -> Self {
        self.add_consuming(arc);
        self
    }

    pub fn produce(mut self, arc: ProducingArc) -> Self {
        self.add_producing(arc);
        self
    }

    pub fn add_consuming(&mut self, arc: ConsumingArc) {
        self.consuming.push(arc);
    }

    pub fn add_producing(&mut self, arc: ProducingArc) {
        self.producing.push(arc);
    }

    pub fn consuming_arcs(&self) -> &[ConsumingArc] {
        &self.consuming
    }

    pub fn producing_arcs(&self) -> &[ProducingArc] {
        &self.producing
    }

    pub fn is_buffer_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[inline]
    pub fn involves(&self, place: PlaceId) -> bool {
        self.consuming.iter().any(|arc| arc.place == place)
            || self.producing.iter().any(|arc| arc.place == place)
    }

    pub fn is_enabled(&self, places: &IndexVec<PlaceId, Place>) -> bool {
        self.check_places(places).is_ok() && self.rehearse(places).is_some()
    }

    /// Attempts one atomic firing. `Ok(false)` is the forbidden outcome.
    pub fn fire(
        &mut self,
        places: &mut IndexVec<PlaceId, Place>,
        policy: OutputPolicy,
    ) -> Result<bool, FireError> {
        debug_assert!(self.buffer.is_empty());
        self.check_places(places)?;

        let Some(predicted) = self.rehearse(places) else {
            debug!("{}: guards unmet, forbidden", self.name);
            return Ok(false);
        };
        let plan = self.plan_outputs(&predicted, policy)?;

        for idx in self.consume_order() {
            let arc = &self.consuming[idx];
            match arc.take(&mut places[arc.place]) {
                Ok(tokens) => self.buffer.extend(tokens),
                Err(source) => {
                    debug_assert!(false, "{}: consume after passed guard failed", self.name);
                    self.buffer.clear();
                    return Err(FireError::TokenNotFound {
                        transition: self.name.clone(),
                        source,
                    });
                }
            }
        }
        debug_assert!(
            self.buffer
                .iter()
                .map(Token::color)
                .eq(predicted.iter()),
            "{}: consumed tokens differ from the rehearsal",
            self.name
        );
        debug!(
            "{}: consumed {} token(s) from {} arc(s)",
            self.name,
            self.buffer.len(),
            self.consuming.len()
        );

        let mut slots: Vec<Option<Token>> = self.buffer.drain(..).map(Some).collect();
        for (arc, picks) in self.producing.iter().zip(plan) {
            let tokens: Vec<Token> = picks
                .into_iter()
                .filter_map(|slot| slots[slot].take())
                .collect();
            if tokens.is_empty() {
                continue;
            }
            debug!(
                "{}: producing {} token(s) of {} into {}",
                self.name,
                tokens.len(),
                arc.color,
                places[arc.place].name
            );
            arc.give(&mut places[arc.place], tokens);
        }

        let discarded = slots.iter().filter(|slot| slot.is_some()).count();
        if discarded > 0 {
            debug!("{}: {} consumed token(s) left the net", self.name, discarded);
        }
        Ok(true)
    }

    fn check_places(&self, places: &IndexVec<PlaceId, Place>) -> Result<(), FireError> {
        let arc_places = self
            .consuming
            .iter()
            .map(|arc| arc.place)
            .chain(self.producing.iter().map(|arc| arc.place));
        for place in arc_places {
            if !places.contains_id(place) {
                return Err(FireError::UnknownPlace {
                    transition: self.name.clone(),
                    place,
                });
            }
        }
        Ok(())
    }

    /// Colored arcs take first so that uncolored arcs only see what is left.
    fn consume_order(&self) -> Vec<usize> {
        colored_first(self.consuming.iter().map(|arc| &arc.color))
    }

    /// Guard phase. Returns the colors the consume phase will buffer, in
    /// buffer order, or `None` if the transition is forbidden.
    fn rehearse(&self, places: &IndexVec<PlaceId, Place>) -> Option<Vec<Color>> {
        if !self
            .consuming
            .iter()
            .all(|arc| arc.is_satisfied(&places[arc.place]))
        {
            return None;
        }

        let mut scratch: BTreeMap<PlaceId, Vec<Color>> = BTreeMap::new();
        let mut predicted = Vec::new();
        for idx in self.consume_order() {
            let arc = &self.consuming[idx];
            let colors = scratch
                .entry(arc.place)
                .or_insert_with(|| places[arc.place].snapshot());
            for _ in 0..arc.amount {
                let position = colors.iter().position(|color| arc.color.matches(color))?;
                predicted.push(colors.remove(position));
            }
        }
        Some(predicted)
    }

    fn plan_outputs(
        &self,
        predicted: &[Color],
        policy: OutputPolicy,
    ) -> Result<OutputPlan, FireError> {
        let mut claimed = vec![false; predicted.len()];
        let mut plan = vec![Vec::new(); self.producing.len()];

        for idx in colored_first(self.producing.iter().map(|arc| &arc.color)) {
            let arc = &self.producing[idx];
            let picks: Vec<usize> = predicted
                .iter()
                .enumerate()
                .filter(|(slot, color)| !claimed[*slot] && arc.color.matches(color))
                .map(|(slot, _)| slot)
                .take(arc.amount)
                .collect();

            if picks.len() < arc.amount {
                match policy {
                    OutputPolicy::Strict => {
                        return Err(FireError::UnmatchedOutput {
                            transition: self.name.clone(),
                            place: arc.place,
                            color: arc.color.clone(),
                            wanted: arc.amount,
                            available: picks.len(),
                        });
                    }
                    OutputPolicy::Drop => debug!(
                        "{}: output arc to {} wants {} of {}, only {} buffered",
                        self.name,
                        arc.place,
                        arc.amount,
                        arc.color,
                        picks.len()
                    ),
                }
            }

            for &slot in &picks {
                claimed[slot] = true;
            }
            plan[idx] = picks;
        }
        Ok(plan)
    }
}

/// Indices of colored arcs in declaration order, then uncolored ones.
fn colored_first<'a>(colors: impl Iterator<Item = &'a ArcColor>) -> Vec<usize> {
    let (colored, uncolored): (Vec<_>, Vec<_>) = colors
        .enumerate()
        .partition(|(_, color)| **color != ArcColor::Any);
    colored
        .into_iter()
        .chain(uncolored)
        .map(|(idx, _)| idx)
        .collect()
}

impl PartialEq for Transition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.consuming == other.consuming
            && self.producing == other.producing
    }
}

impl Eq for Transition {}
