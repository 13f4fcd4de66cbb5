//! # Error Types
//!
//! This module defines all error types for chord normalization.
//!
//! Only two kinds are meant to reach the caller as hard failures:
//! `UnknownNotation` and `Grammar`. `NotAChord` is per-candidate and is routed
//! to a diagnostics sink by the dispatcher, never raised out of a span.
//!
//! ## Error Types
//! - `NotAChord` - Candidate text did not match the notation's grammar
//! - `AmbiguousMatch` - Two grammar entries claim the same spelling
//! - `UnknownNotation` - Identifier not present in the grammar set
//! - `Grammar` - Malformed grammar configuration
//!
//! ## Usage
//! ```rust
//! use chordnorm::{canonicalize, ChordError};
//!
//! match canonicalize("Fa maj 7", "it") {
//!     Ok(chord) => assert_eq!(chord, "[Fa maj7]"),
//!     Err(ChordError::UnknownNotation(id)) => eprintln!("no grammar for {}", id),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChordError {
    /// Candidate text is not a chord in the selected notation.
    ///
    /// `leftover` is `None` when no root spelling matched at all, and holds
    /// the unconsumed part of the scan buffer otherwise.
    ///
    /// # Example
    /// ```
    /// # use chordnorm::ChordError;
    /// let err = ChordError::NotAChord {
    ///     candidate: "Famaj7x".to_string(),
    ///     leftover: Some("x".to_string()),
    /// };
    /// assert_eq!(err.to_string(), "Not a chord: 'Famaj7x' (unrecognized 'x')");
    ///
    /// let err = ChordError::NotAChord { candidate: "casa".to_string(), leftover: None };
    /// assert_eq!(err.to_string(), "Not a chord: 'casa' (no root)");
    /// ```
    #[error("Not a chord: '{candidate}' ({})", describe_leftover(.leftover))]
    NotAChord {
        candidate: String,
        leftover: Option<String>,
    },

    /// Two grammar entries claim the same spelling.
    ///
    /// This is a defect in the grammar tables, not in the input.
    ///
    /// # Example
    /// ```
    /// # use chordnorm::ChordError;
    /// let err = ChordError::AmbiguousMatch {
    ///     spelling: "m".to_string(),
    ///     first: "quality minor".to_string(),
    ///     second: "extension m".to_string(),
    /// };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Ambiguous grammar: 'm' is claimed by quality minor and extension m"
    /// );
    /// ```
    #[error("Ambiguous grammar: '{spelling}' is claimed by {first} and {second}")]
    AmbiguousMatch {
        spelling: String,
        first: String,
        second: String,
    },

    /// Notation identifier is unknown or has no grammar loaded.
    ///
    /// # Example
    /// ```
    /// # use chordnorm::ChordError;
    /// let err = ChordError::UnknownNotation("klingon".to_string());
    /// assert_eq!(err.to_string(), "Unknown notation: klingon");
    /// ```
    #[error("Unknown notation: {0}")]
    UnknownNotation(String),

    /// Malformed grammar configuration.
    ///
    /// # Example
    /// ```
    /// # use chordnorm::ChordError;
    /// let err = ChordError::Grammar("italian: no roots".to_string());
    /// assert_eq!(err.to_string(), "Invalid grammar: italian: no roots");
    /// ```
    #[error("Invalid grammar: {0}")]
    Grammar(String),
}

fn describe_leftover(leftover: &Option<String>) -> String {
    match leftover {
        Some(rest) => format!("unrecognized '{}'", rest),
        None => "no root".to_string(),
    }
}
