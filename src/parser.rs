//! 初始库所描述的解析：每个库所写作 `(red,blue)`，`()` 表示空库所。
use nom::{
    IResult, Parser,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::all_consuming,
    sequence::delimited,
};
use thiserror::Error;

use crate::net::token::Color;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedConfiguration {
    #[error("place #{index} `{input}` is not a single parenthesized list")]
    Unbalanced { index: usize, input: String },
    #[error("place #{index} `{input}`: `{segment}` is not a color label")]
    BadLabel {
        index: usize,
        input: String,
        segment: String,
    },
}

fn envelope(input: &str) -> IResult<&str, &str> {
    delimited(
        (multispace0, char('(')),
        take_while(|c: char| c != '(' && c != ')'),
        (char(')'), multispace0),
    )
    .parse(input)
}

fn label(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || matches!(c, '_' | '-' | '.')).parse(input)
}

/// Parses one place. Empty segments (`(red,,blue)`) are ignored.
pub fn parse_place(index: usize, input: &str) -> Result<Vec<Color>, MalformedConfiguration> {
    let (_, inner) = all_consuming(envelope)
        .parse(input)
        .map_err(|_| MalformedConfiguration::Unbalanced {
            index,
            input: input.to_string(),
        })?;

    let mut colors = Vec::new();
    for segment in inner.split(',').map(str::trim) {
        if segment.is_empty() {
            continue;
        }
        let (_, name) = all_consuming(label).parse(segment).map_err(|_| {
            MalformedConfiguration::BadLabel {
                index,
                input: input.to_string(),
                segment: segment.to_string(),
            }
        })?;
        colors.push(Color::from(name));
    }
    Ok(colors)
}

pub fn parse_places<S: AsRef<str>>(specs: &[S]) -> Result<Vec<Vec<Color>>, MalformedConfiguration> {
    specs
        .iter()
        .enumerate()
        .map(|(index, spec)| parse_place(index, spec.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(colors: &[Color]) -> Vec<&str> {
        colors.iter().map(Color::as_str).collect()
    }

    #[test]
    fn parses_lists_and_empty_places() {
        let places = parse_places(&["(red,blue)", "()", " ( green , red ) "]).unwrap();
        assert_eq!(labels(&places[0]), vec!["red", "blue"]);
        assert!(places[1].is_empty());
        assert_eq!(labels(&places[2]), vec!["green", "red"]);
    }

    #[test]
    fn empty_segments_are_skipped() {
        assert_eq!(labels(&parse_place(0, "(red,,blue,)").unwrap()), vec!["red", "blue"]);
        assert!(parse_place(0, "( , )").unwrap().is_empty());
    }

    #[test]
    fn unbalanced_delimiters_are_rejected() {
        for input in ["(red", "red)", "red", "((red))", "(red)(blue)", ""] {
            assert!(
                matches!(
                    parse_place(3, input),
                    Err(MalformedConfiguration::Unbalanced { index: 3, .. })
                ),
                "{input:?}"
            );
        }
    }

    #[test]
    fn unreadable_segment_is_rejected() {
        let err = parse_places(&["()", "(red, bl ue)"]).unwrap_err();
        assert_eq!(
            err,
            MalformedConfiguration::BadLabel {
                index: 1,
                input: "(red, bl ue)".into(),
                segment: "bl ue".into(),
            }
        );
    }
}
