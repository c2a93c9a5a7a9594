//! Transition label patterns.
//!
//! A pattern has the same shape as a transition label,
//! `"<prev> => <action> => <next>"`, where any segment may be `*`.

use super::error::PatternError;
use crate::core::{Tagged, LABEL_SEPARATOR};
use std::fmt;
use std::str::FromStr;
use stillwater::validation::Validation;

const WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Any,
    Tag(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if raw == WILDCARD {
            Self::Any
        } else {
            Self::Tag(raw.to_string())
        }
    }

    fn matches(&self, tag: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Tag(expected) => expected == tag,
        }
    }

    fn tag(&self) -> Option<&str> {
        match self {
            Self::Any => None,
            Self::Tag(tag) => Some(tag),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(WILDCARD),
            Self::Tag(tag) => f.write_str(tag),
        }
    }
}

/// A parsed `"<prev> => <action> => <next>"` pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPattern {
    prev: Segment,
    action: Segment,
    next: Segment,
}

impl TransitionPattern {
    /// Parse a pattern without checking tags against any domain.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let segments: Vec<&str> = pattern.split(LABEL_SEPARATOR.trim()).map(str::trim).collect();
        if segments.len() != 3 {
            return Err(PatternError::Malformed {
                pattern: pattern.to_string(),
                segments: segments.len(),
            });
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(PatternError::EmptySegment {
                pattern: pattern.to_string(),
            });
        }

        Ok(Self {
            prev: Segment::parse(segments[0]),
            action: Segment::parse(segments[1]),
            next: Segment::parse(segments[2]),
        })
    }

    /// Parse a pattern and check its tags against the state and action domains.
    ///
    /// Unknown tags in all three segments are reported together.
    pub fn parse_for<S: Tagged, A: Tagged>(pattern: &str) -> Validation<Self, Vec<PatternError>> {
        let parsed = match Self::parse(pattern) {
            Ok(parsed) => parsed,
            Err(err) => return Validation::Failure(vec![err]),
        };

        let mut errors = Vec::new();
        for segment in [&parsed.prev, &parsed.next] {
            if let Some(tag) = segment.tag().filter(|tag| !S::has_tag(tag)) {
                errors.push(PatternError::UnknownState {
                    pattern: pattern.to_string(),
                    tag: tag.to_string(),
                });
            }
        }
        if let Some(tag) = parsed.action.tag().filter(|tag| !A::has_tag(tag)) {
            errors.push(PatternError::UnknownAction {
                pattern: pattern.to_string(),
                tag: tag.to_string(),
            });
        }

        if errors.is_empty() {
            Validation::Success(parsed)
        } else {
            Validation::Failure(errors)
        }
    }

    /// Parse and check a list of patterns, collecting every error.
    pub fn parse_all_for<'p, S: Tagged, A: Tagged>(
        patterns: impl IntoIterator<Item = &'p str>,
    ) -> Validation<Vec<Self>, Vec<PatternError>> {
        let mut parsed = Vec::new();
        let mut errors = Vec::new();
        for pattern in patterns {
            match Self::parse_for::<S, A>(pattern) {
                Validation::Success(p) => parsed.push(p),
                Validation::Failure(mut e) => errors.append(&mut e),
            }
        }

        if errors.is_empty() {
            Validation::Success(parsed)
        } else {
            Validation::Failure(errors)
        }
    }

    pub fn matches(&self, prev: &str, action: &str, next: &str) -> bool {
        self.prev.matches(prev) && self.action.matches(action) && self.next.matches(next)
    }

    /// Match against a formatted transition label.
    pub fn matches_label(&self, label: &str) -> bool {
        let mut parts = label.split(LABEL_SEPARATOR);
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(prev), Some(action), Some(next), None) => self.matches(prev, action, next),
            _ => false,
        }
    }
}

impl FromStr for TransitionPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TransitionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{LABEL_SEPARATOR}{}{LABEL_SEPARATOR}{}",
            self.prev, self.action, self.next
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    #[allow(dead_code)]
    enum Phase {
        Idle,
        Busy,
    }

    crate::tagged!(Phase {
        Idle => "IDLE",
        Busy => "BUSY",
    });

    #[derive(Debug)]
    #[allow(dead_code)]
    enum Event {
        Start,
        Stop,
    }

    crate::tagged!(Event {
        Start => "START",
        Stop => "STOP",
    });

    #[test]
    fn exact_pattern_matches_only_its_label() {
        let pattern = TransitionPattern::parse("IDLE => START => BUSY").unwrap();
        assert!(pattern.matches("IDLE", "START", "BUSY"));
        assert!(!pattern.matches("BUSY", "START", "BUSY"));
        assert!(pattern.matches_label("IDLE => START => BUSY"));
        assert!(!pattern.matches_label("IDLE => START"));
    }

    #[test]
    fn wildcards_match_any_tag() {
        let pattern: TransitionPattern = "* => STOP => IDLE".parse().unwrap();
        assert!(pattern.matches("BUSY", "STOP", "IDLE"));
        assert!(pattern.matches("IDLE", "STOP", "IDLE"));
        assert!(!pattern.matches("BUSY", "START", "IDLE"));
    }

    #[test]
    fn whitespace_around_segments_is_ignored() {
        let pattern = TransitionPattern::parse("IDLE=>START  =>   BUSY").unwrap();
        assert_eq!(pattern.to_string(), "IDLE => START => BUSY");
    }

    #[test]
    fn malformed_patterns_are_rejected() {
        assert_eq!(
            TransitionPattern::parse("IDLE => START"),
            Err(PatternError::Malformed {
                pattern: "IDLE => START".to_string(),
                segments: 2,
            })
        );
        assert_eq!(
            TransitionPattern::parse("IDLE =>  => BUSY"),
            Err(PatternError::EmptySegment {
                pattern: "IDLE =>  => BUSY".to_string(),
            })
        );
    }

    #[test]
    fn parse_for_reports_every_unknown_tag() {
        match TransitionPattern::parse_for::<Phase, Event>("GONE => JUMP => LOST") {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 3);
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, PatternError::UnknownAction { tag, .. } if tag == "JUMP")));
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn parse_for_accepts_wildcards() {
        assert!(matches!(
            TransitionPattern::parse_for::<Phase, Event>("* => * => BUSY"),
            Validation::Success(_)
        ));
    }

    #[test]
    fn parse_all_for_collects_errors_across_patterns() {
        let result = TransitionPattern::parse_all_for::<Phase, Event>([
            "IDLE => START => BUSY",
            "IDLE => FLY",
            "BUSY => STOP => DONE",
        ]);
        match result {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 2);
                assert!(matches!(errors[0], PatternError::Malformed { .. }));
                assert!(matches!(errors[1], PatternError::UnknownState { .. }));
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }
}
