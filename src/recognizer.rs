//! # Chord Recognizer
//!
//! Parses one candidate unit into a [`ChordToken`].
//!
//! ## Algorithm
//! 1. Strip surrounding ChordPro brackets, then an enclosing parenthesis pair
//!    (recorded as `parenthesized`).
//! 2. Delete all whitespace, so `"Fa maj 7"`, `"Fa maj7"` and `"Famaj7"` give
//!    the same scan buffer.
//! 3. Match a root spelling as a prefix, longest first. If the rest of the
//!    buffer cannot be consumed, the next shorter root spelling is tried
//!    (German `Esus4` is `E` + `sus4`, not `Es` + `us4`).
//! 4. Optional accidental, unless the root spelling already carried one.
//! 5. Keywords, longest first at each position: at most one quality marker,
//!    directly after the root, then any number of extensions.
//! 6. Optional bass separator followed by a root spelling and accidental.
//!
//! Anything left over makes the candidate `NotAChord`, with the leftover
//! reported so callers can log detection gaps.

use crate::chord::{BassNote, ChordToken, Quality};
use crate::error::ChordError;
use crate::grammar::{Grammar, Keyword, RootSpelling};

enum Parse {
    Complete(ChordToken),
    Stuck(String),
}

/// Recognize `candidate` as a chord of `grammar`'s notation.
pub fn recognize(candidate: &str, grammar: &Grammar) -> Result<ChordToken, ChordError> {
    let (interior, parenthesized) = unwrap_candidate(candidate);
    let buffer: String = interior.chars().filter(|c| !c.is_whitespace()).collect();

    let mut leftover: Option<String> = None;
    for root in grammar.root_matches(&buffer) {
        match parse_after_root(&buffer[root.spelling.len()..], root, grammar)? {
            Parse::Complete(mut token) => {
                token.parenthesized = parenthesized;
                return Ok(token);
            }
            Parse::Stuck(rest) => {
                if leftover.as_ref().map_or(true, |best| rest.len() < best.len()) {
                    leftover = Some(rest);
                }
            }
        }
    }

    Err(ChordError::NotAChord {
        candidate: candidate.trim().to_string(),
        leftover,
    })
}

/// Strip `[...]` then `(...)`. Returns the interior and whether parentheses
/// were present.
fn unwrap_candidate(candidate: &str) -> (&str, bool) {
    let mut text = candidate.trim();
    if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        text = inner.trim();
    }
    match text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) => (inner.trim(), true),
        None => (text, false),
    }
}

fn parse_after_root(
    mut rest: &str,
    root: &RootSpelling,
    grammar: &Grammar,
) -> Result<Parse, ChordError> {
    let mut token = ChordToken::new(root.root.clone());
    token.accidental = root.accidental;
    if root.implies_minor {
        token.quality = Quality::Minor;
    }

    if token.accidental.is_none() {
        if let Some((accidental, len)) = grammar.match_accidental(rest) {
            token.accidental = Some(accidental);
            rest = &rest[len..];
        }
    }

    let mut explicit_quality = false;
    while let Some((keyword, len)) = grammar.match_keyword(rest)? {
        match keyword {
            Keyword::Quality(quality) if !explicit_quality && token.extensions.is_empty() => {
                token.quality = *quality;
                explicit_quality = true;
            }
            Keyword::Extension(extension) => token.extensions.push(extension.clone()),
            // a second quality, or a quality after an extension
            Keyword::Quality(_) => break,
        }
        rest = &rest[len..];
    }

    if let Some(after) = rest.strip_prefix(grammar.bass_separator()) {
        if let Some(bass) = parse_bass(after, grammar) {
            token.bass = Some(bass);
            rest = "";
        }
    }

    if rest.is_empty() {
        Ok(Parse::Complete(token))
    } else {
        Ok(Parse::Stuck(rest.to_string()))
    }
}

/// The whole of `text` must be a root spelling plus optional accidental.
fn parse_bass(text: &str, grammar: &Grammar) -> Option<BassNote> {
    grammar.root_matches(text).find_map(|root| {
        let rest = &text[root.spelling.len()..];
        if rest.is_empty() {
            return Some(BassNote {
                root: root.root.clone(),
                accidental: root.accidental,
            });
        }
        if root.accidental.is_some() {
            return None;
        }
        match grammar.match_accidental(rest) {
            Some((accidental, len)) if len == rest.len() => Some(BassNote {
                root: root.root.clone(),
                accidental: Some(accidental),
            }),
            _ => None,
        }
    })
}
