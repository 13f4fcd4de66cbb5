//! # Chord Types
//!
//! Structured form of one recognized chord.
//!
//! ```text
//! ChordToken
//!   ├── root: String           canonical root name from the grammar ("Fa", "H")
//!   ├── accidental: Option<Accidental>
//!   ├── quality: Quality       Major unless a marker (or a minor root spelling) says otherwise
//!   ├── extensions: Vec<String> canonical extension keywords, in input order
//!   ├── bass: Option<BassNote> slash-chord bass
//!   └── parenthesized: bool    output wrapping only, not part of chord identity
//! ```
//!
//! A token is built once by the recognizer and consumed by the canonicalizer.
//! Root and extension strings are the grammar's canonical spellings, so two
//! tokens from the same notation compare equal exactly when they render the
//! same chord.

use serde::Deserialize;

/// Sharp or flat, at most one per note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accidental {
    Sharp,
    Flat,
}

/// Chord quality. Major is implicit and has no marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quality {
    #[default]
    Major,
    Minor,
    Diminished,
    Augmented,
}

/// Bass note of a slash chord.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BassNote {
    pub root: String,
    pub accidental: Option<Accidental>,
}

#[derive(Debug, Clone, Eq)]
pub struct ChordToken {
    pub root: String,
    pub accidental: Option<Accidental>,
    pub quality: Quality,
    pub extensions: Vec<String>,
    pub bass: Option<BassNote>,
    pub parenthesized: bool,
}

impl ChordToken {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            accidental: None,
            quality: Quality::Major,
            extensions: Vec::new(),
            bass: None,
            parenthesized: false,
        }
    }

    pub fn with_accidental(mut self, accidental: Accidental) -> Self {
        self.accidental = Some(accidental);
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extensions.push(extension.into());
        self
    }

    pub fn with_bass(mut self, root: impl Into<String>, accidental: Option<Accidental>) -> Self {
        self.bass = Some(BassNote {
            root: root.into(),
            accidental,
        });
        self
    }

    pub fn parenthesized(mut self) -> Self {
        self.parenthesized = true;
        self
    }
}

// `parenthesized` only affects output wrapping.
impl PartialEq for ChordToken {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
            && self.accidental == other.accidental
            && self.quality == other.quality
            && self.extensions == other.extensions
            && self.bass == other.bass
    }
}

impl std::hash::Hash for ChordToken {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.root.hash(state);
        self.accidental.hash(state);
        self.quality.hash(state);
        self.extensions.hash(state);
        self.bass.hash(state);
    }
}
