//! 弧：消耗弧（库所 → 迁移）与产出弧（迁移 → 库所）。
//!
//! 守卫判定 (`is_satisfied`) 与变更动作 (`take`/`give`) 分离，
//! 迁移因此可以先检查全部守卫，再修改任何库所。
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::net::ids::PlaceId;
use crate::net::place::{Place, TokenNotFound};
use crate::net::token::{Color, Token};

pub type Amount = usize;

/// Which tokens an arc moves.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArcColor {
    /// Uncolored: the first tokens in storage order.
    Any,
    Color(Color),
}

impl ArcColor {
    pub fn matches(&self, color: &Color) -> bool {
        match self {
            ArcColor::Any => true,
            ArcColor::Color(wanted) => wanted == color,
        }
    }

    pub fn as_color(&self) -> Option<&Color> {
        match self {
            ArcColor::Any => None,
            ArcColor::Color(color) => Some(color),
        }
    }
}

impl fmt::Debug for ArcColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for ArcColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArcColor::Any => f.write_str("*"),
            ArcColor::Color(color) => write!(f, "{color}"),
        }
    }
}

impl From<Option<Color>> for ArcColor {
    fn from(value: Option<Color>) -> Self {
        value.map_or(ArcColor::Any, ArcColor::Color)
    }
}

impl From<&str> for ArcColor {
    fn from(value: &str) -> Self {
        ArcColor::Color(Color::from(value))
    }
}

impl From<Color> for ArcColor {
    fn from(value: Color) -> Self {
        ArcColor::Color(value)
    }
}

/// Place → transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumingArc {
    pub place: PlaceId,
    pub color: ArcColor,
    pub amount: Amount,
}

impl ConsumingArc {
    pub fn new(place: PlaceId, color: impl Into<ArcColor>, amount: Amount) -> Self {
        Self {
            place,
            color: color.into(),
            amount,
        }
    }

    pub fn is_satisfied(&self, place: &Place) -> bool {
        if place.contains() < self.amount {
            return false;
        }
        match &self.color {
            ArcColor::Any => true,
            ArcColor::Color(color) => place.count_of(color) >= self.amount,
        }
    }

    /// Removes `amount` tokens. Only valid right after `is_satisfied`
    /// held on the same, unmodified place.
    pub fn take(&self, place: &mut Place) -> Result<Vec<Token>, TokenNotFound> {
        let mut taken = Vec::with_capacity(self.amount);
        for _ in 0..self.amount {
            let token = match &self.color {
                ArcColor::Any => place.remove_any()?,
                ArcColor::Color(color) => place.remove_token(color)?,
            };
            taken.push(token);
        }
        Ok(taken)
    }
}

/// Transition → place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducingArc {
    pub place: PlaceId,
    pub color: ArcColor,
    pub amount: Amount,
}

impl ProducingArc {
    pub fn new(place: PlaceId, color: impl Into<ArcColor>, amount: Amount) -> Self {
        Self {
            place,
            color: color.into(),
            amount,
        }
    }

    pub fn give(&self, place: &mut Place, tokens: Vec<Token>) {
        debug_assert!(tokens.iter().all(|token| self.color.matches(token.color())));
        place.add_tokens(tokens);
    }
}
