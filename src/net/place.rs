//! 库所：托肯多重集及其派生计数。
use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use crate::net::token::{Color, Token};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenNotFound {
    #[error("place `{place}` holds no token of color `{color}`")]
    Color { place: String, color: Color },
    #[error("place `{place}` holds no token")]
    Empty { place: String },
}

/// A bag of tokens. `contains` always equals the number of held tokens.
///
/// The bag keeps insertion order, which is what [`Place::snapshot`]
/// exposes; the order carries no meaning beyond stable reporting.
#[derive(Clone, Serialize, PartialEq, Eq, Debug)]
pub struct Place {
    pub name: String,
    tokens: Vec<Token>,
    contains: usize,
}

impl Place {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tokens: Vec::new(),
            contains: 0,
        }
    }

    pub fn with_tokens<C>(name: impl Into<String>, colors: impl IntoIterator<Item = C>) -> Self
    where
        C: Into<Color>,
    {
        let mut place = Self::new(name);
        place.add_tokens(colors.into_iter().map(Token::new));
        place
    }

    pub fn contains(&self) -> usize {
        self.contains
    }

    pub fn is_empty(&self) -> bool {
        self.contains == 0
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn add_tokens(&mut self, tokens: impl IntoIterator<Item = Token>) {
        for token in tokens {
            self.tokens.push(token);
            self.contains += 1;
        }
        self.check_invariant();
    }

    /// Removes the earliest token of `color`.
    pub fn remove_token(&mut self, color: &Color) -> Result<Token, TokenNotFound> {
        let position = self
            .tokens
            .iter()
            .position(|token| token.color() == color)
            .ok_or_else(|| TokenNotFound::Color {
                place: self.name.clone(),
                color: color.clone(),
            })?;
        let token = self.tokens.remove(position);
        self.contains -= 1;
        self.check_invariant();
        Ok(token)
    }

    /// Removes the earliest token regardless of color.
    pub fn remove_any(&mut self) -> Result<Token, TokenNotFound> {
        if self.tokens.is_empty() {
            return Err(TokenNotFound::Empty {
                place: self.name.clone(),
            });
        }
        let token = self.tokens.remove(0);
        self.contains -= 1;
        self.check_invariant();
        Ok(token)
    }

    pub fn count_of(&self, color: &Color) -> usize {
        self.tokens
            .iter()
            .filter(|token| token.color() == color)
            .count()
    }

    pub fn colors_present(&self) -> BTreeSet<Color> {
        self.tokens.iter().map(|token| token.color().clone()).collect()
    }

    pub fn snapshot(&self) -> Vec<Color> {
        self.tokens.iter().map(|token| token.color().clone()).collect()
    }

    pub fn is_consistent(&self) -> bool {
        self.contains == self.tokens.len()
    }

    #[inline]
    fn check_invariant(&self) {
        debug_assert!(
            self.is_consistent(),
            "place `{}` count {} diverged from {} held tokens",
            self.name,
            self.contains,
            self.tokens.len()
        );
    }
}
