use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ChordError;

/// Chord-spelling convention of a song's language.
///
/// Slovenian and Croatian song sheets use the German/Slavic convention
/// (`H` for B natural, `-is` sharps, lowercase roots for minor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Notation {
    Italian,
    Spanish,
    German,
    English,
}

impl Notation {
    pub const ALL: [Notation; 4] = [
        Notation::Italian,
        Notation::Spanish,
        Notation::German,
        Notation::English,
    ];

    /// Parse a language code or name ("it", "italian", "sl", "croatian", ...).
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "it" | "ita" | "italian" => Some(Notation::Italian),
            "es" | "spa" | "spanish" => Some(Notation::Spanish),
            "de" | "ger" | "german" | "sl" | "slovenian" | "hr" | "croatian" => {
                Some(Notation::German)
            }
            "en" | "eng" | "english" => Some(Notation::English),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Notation::Italian => "italian",
            Notation::Spanish => "spanish",
            Notation::German => "german",
            Notation::English => "english",
        }
    }
}

impl FromStr for Notation {
    type Err = ChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Notation::from_id(s).ok_or_else(|| ChordError::UnknownNotation(s.to_string()))
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes() {
        assert_eq!(Notation::from_id("it"), Some(Notation::Italian));
        assert_eq!(Notation::from_id("ES"), Some(Notation::Spanish));
        assert_eq!(Notation::from_id(" sl "), Some(Notation::German));
        assert_eq!(Notation::from_id("hr"), Some(Notation::German));
        assert_eq!(Notation::from_id("english"), Some(Notation::English));
    }

    #[test]
    fn test_unknown_identifier() {
        let err = "fr".parse::<Notation>().unwrap_err();
        assert_eq!(err, ChordError::UnknownNotation("fr".to_string()));
    }

    #[test]
    fn test_name_round_trips() {
        for notation in Notation::ALL {
            assert_eq!(Notation::from_id(notation.name()), Some(notation));
        }
    }
}
