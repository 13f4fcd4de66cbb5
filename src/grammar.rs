//! # Grammar Tables
//!
//! Per-notation chord spelling data: root spellings, accidental markers,
//! quality and extension keywords, and the spacing rules the canonicalizer
//! applies. Nothing in the tokenizer, recognizer or canonicalizer branches on
//! a particular notation; every difference between Italian `Re m9`, Spanish
//! `Re-9` and German `d9` lives in these tables.
//!
//! ## Configuration
//! Tables are YAML (`grammars.yaml` at the crate root, embedded at build time).
//! `RawGrammarSet` mirrors the file; [`GrammarSet::from_yaml`] compiles it into
//! [`Grammar`] values whose keyword lists are sorted longest-first, which is
//! what makes `maj7` win over `m` at the same buffer position.
//!
//! ```yaml
//! notations:
//!   italian:
//!     roots:
//!       - { name: Re, spellings: [RE] }
//!     qualities:
//!       minor: { render: m, spellings: [min] }
//!     extensions:
//!       - { render: maj7, spellings: [M7] }
//!       - { render: "9" }
//!     quality-gap: true
//! ```
//!
//! ## Compilation checks
//! - every notation has at least one root, no spelling is empty
//! - a spelling may not mean two different things within one keyword class
//!   (roots, accidentals, qualities + extensions); that is an `AmbiguousMatch`
//! - `column-gap` is at least 2, so single spaces never split a chord
//!
//! ## Related Modules
//! - `recognizer` - Matches buffers against these tables
//! - `canonical` - Renders tokens using the render spellings and gap rules
//! - `tokenizer` - Uses separators, column gap and the chord-unit predicate

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::OnceLock;

use crate::chord::{Accidental, Quality};
use crate::dispatcher::Normalizer;
use crate::error::ChordError;
use crate::notation::Notation;

const BUILTIN_GRAMMARS: &str = include_str!("../grammars.yaml");

const DEFAULT_COLUMN_GAP: usize = 4;

fn default_column_gap() -> usize {
    DEFAULT_COLUMN_GAP
}

fn default_bass_separator() -> String {
    "/".to_string()
}

/// How a minor chord is marked in output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MinorStyle {
    /// Render the minor quality's marker (`Re m`, `Re-`, `Dm`).
    #[default]
    Marker,
    /// Lowercase the root and drop the marker (`d`, `fis7`).
    LowercaseRoot,
}

#[derive(Deserialize, Debug)]
pub struct RawGrammarSet {
    pub notations: BTreeMap<Notation, RawGrammar>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct RawGrammar {
    pub roots: Vec<RawRoot>,
    #[serde(default)]
    pub fused_roots: Vec<RawFusedRoot>,
    #[serde(default)]
    pub accidentals: RawAccidentals,
    #[serde(default)]
    pub qualities: RawQualities,
    #[serde(default)]
    pub minor_style: MinorStyle,
    #[serde(default)]
    pub extensions: Vec<RawKeyword>,
    #[serde(default)]
    pub quality_gap: bool,
    #[serde(default)]
    pub word_extension_gap: bool,
    #[serde(default)]
    pub separators: Vec<String>,
    #[serde(default = "default_column_gap")]
    pub column_gap: usize,
    #[serde(default = "default_bass_separator")]
    pub bass_separator: String,
}

/// A root name plus its alternate spellings. `name` is always a spelling too.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct RawRoot {
    pub name: String,
    #[serde(default)]
    pub spellings: Vec<String>,
    #[serde(default)]
    pub minor_spellings: Vec<String>,
}

/// Spellings that carry root and accidental in one word (German `Fis`).
#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct RawFusedRoot {
    pub root: String,
    pub accidental: Accidental,
    pub render: String,
    #[serde(default)]
    pub spellings: Vec<String>,
    #[serde(default)]
    pub minor_spellings: Vec<String>,
}

/// A canonical `render` spelling plus alternates that normalize to it.
#[derive(Deserialize, Debug, Clone)]
pub struct RawKeyword {
    pub render: String,
    #[serde(default)]
    pub spellings: Vec<String>,
}

impl RawKeyword {
    fn all_spellings(&self) -> impl Iterator<Item = &String> {
        std::iter::once(&self.render).chain(self.spellings.iter())
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct RawAccidentals {
    pub sharp: Option<RawKeyword>,
    pub flat: Option<RawKeyword>,
}

#[derive(Deserialize, Debug, Default)]
pub struct RawQualities {
    pub minor: Option<RawKeyword>,
    pub diminished: Option<RawKeyword>,
    pub augmented: Option<RawKeyword>,
}

/// One root spelling as the recognizer sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct RootSpelling {
    pub spelling: String,
    pub root: String,
    pub accidental: Option<Accidental>,
    pub implies_minor: bool,
}

/// A quality or extension keyword.
#[derive(Debug, Clone, PartialEq)]
pub enum Keyword {
    Quality(Quality),
    Extension(String),
}

impl Keyword {
    fn describe(&self) -> String {
        match self {
            Keyword::Quality(q) => format!("quality {:?}", q).to_lowercase(),
            Keyword::Extension(ext) => format!("extension {}", ext),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry<T> {
    spelling: String,
    value: T,
}

/// Compiled, read-only grammar for one notation.
#[derive(Debug, Clone)]
pub struct Grammar {
    notation: Notation,
    roots: Vec<RootSpelling>,
    accidentals: Vec<Entry<Accidental>>,
    keywords: Vec<Entry<Keyword>>,
    accidental_render: HashMap<Accidental, String>,
    quality_render: HashMap<Quality, String>,
    fused_render: HashMap<(String, Accidental), String>,
    minor_style: MinorStyle,
    quality_gap: bool,
    word_extension_gap: bool,
    separators: Vec<String>,
    column_gap: usize,
    bass_separator: String,
}

impl Grammar {
    /// Compile a raw table, validating it and ordering every keyword class
    /// longest-first.
    pub fn compile(notation: Notation, raw: RawGrammar) -> Result<Self, ChordError> {
        if raw.roots.is_empty() {
            return Err(ChordError::Grammar(format!("{}: no roots", notation)));
        }
        if raw.column_gap < 2 {
            return Err(ChordError::Grammar(format!(
                "{}: column-gap must be at least 2, got {}",
                notation, raw.column_gap
            )));
        }
        if raw.bass_separator.is_empty() || raw.separators.iter().any(|s| s.trim().is_empty()) {
            return Err(ChordError::Grammar(format!(
                "{}: separators must be non-blank",
                notation
            )));
        }

        let mut roots: Vec<RootSpelling> = Vec::new();
        for root in &raw.roots {
            let plain = std::iter::once(&root.name).chain(root.spellings.iter());
            for spelling in plain {
                insert_root(&mut roots, notation, spelling, &root.name, None, false)?;
            }
            for spelling in &root.minor_spellings {
                insert_root(&mut roots, notation, spelling, &root.name, None, true)?;
            }
        }

        let mut fused_render = HashMap::new();
        for fused in &raw.fused_roots {
            if !raw.roots.iter().any(|r| r.name == fused.root) {
                return Err(ChordError::Grammar(format!(
                    "{}: fused root '{}' refers to unknown root '{}'",
                    notation, fused.render, fused.root
                )));
            }
            let acc = Some(fused.accidental);
            let plain = std::iter::once(&fused.render).chain(fused.spellings.iter());
            for spelling in plain {
                insert_root(&mut roots, notation, spelling, &fused.root, acc, false)?;
            }
            for spelling in &fused.minor_spellings {
                insert_root(&mut roots, notation, spelling, &fused.root, acc, true)?;
            }
            fused_render.insert((fused.root.clone(), fused.accidental), fused.render.clone());
        }
        sort_longest_first(&mut roots, |r| &r.spelling);

        let mut accidentals = Vec::new();
        let mut accidental_render = HashMap::new();
        let declared = [
            (Accidental::Sharp, &raw.accidentals.sharp),
            (Accidental::Flat, &raw.accidentals.flat),
        ];
        for (accidental, keyword) in declared {
            let Some(keyword) = keyword else { continue };
            for spelling in keyword.all_spellings() {
                insert_entry(&mut accidentals, notation, spelling, accidental, |a| {
                    format!("accidental {:?}", a).to_lowercase()
                })?;
            }
            accidental_render.insert(accidental, keyword.render.clone());
        }
        sort_longest_first(&mut accidentals, |e| &e.spelling);

        let mut keywords = Vec::new();
        let mut quality_render = HashMap::new();
        let declared = [
            (Quality::Minor, &raw.qualities.minor),
            (Quality::Diminished, &raw.qualities.diminished),
            (Quality::Augmented, &raw.qualities.augmented),
        ];
        for (quality, keyword) in declared {
            let Some(keyword) = keyword else { continue };
            for spelling in keyword.all_spellings() {
                insert_entry(
                    &mut keywords,
                    notation,
                    spelling,
                    Keyword::Quality(quality),
                    Keyword::describe,
                )?;
            }
            quality_render.insert(quality, keyword.render.clone());
        }
        for keyword in &raw.extensions {
            for spelling in keyword.all_spellings() {
                insert_entry(
                    &mut keywords,
                    notation,
                    spelling,
                    Keyword::Extension(keyword.render.clone()),
                    Keyword::describe,
                )?;
            }
        }
        sort_longest_first(&mut keywords, |e| &e.spelling);

        Ok(Self {
            notation,
            roots,
            accidentals,
            keywords,
            accidental_render,
            quality_render,
            fused_render,
            minor_style: raw.minor_style,
            quality_gap: raw.quality_gap,
            word_extension_gap: raw.word_extension_gap,
            separators: raw.separators,
            column_gap: raw.column_gap,
            bass_separator: raw.bass_separator,
        })
    }

    pub fn notation(&self) -> Notation {
        self.notation
    }

    pub fn minor_style(&self) -> MinorStyle {
        self.minor_style
    }

    pub fn quality_gap(&self) -> bool {
        self.quality_gap
    }

    pub fn word_extension_gap(&self) -> bool {
        self.word_extension_gap
    }

    pub fn separators(&self) -> &[String] {
        &self.separators
    }

    pub fn column_gap(&self) -> usize {
        self.column_gap
    }

    pub fn bass_separator(&self) -> &str {
        &self.bass_separator
    }

    /// Root spellings that prefix `buffer`, longest first.
    pub fn root_matches<'g, 'b>(
        &'g self,
        buffer: &'b str,
    ) -> impl Iterator<Item = &'g RootSpelling> + 'b
    where
        'g: 'b,
    {
        self.roots
            .iter()
            .filter(move |r| buffer.starts_with(r.spelling.as_str()))
    }

    /// Longest accidental marker at the start of `buffer`, with its byte length.
    pub fn match_accidental(&self, buffer: &str) -> Option<(Accidental, usize)> {
        self.accidentals
            .iter()
            .find(|e| buffer.starts_with(e.spelling.as_str()))
            .map(|e| (e.value, e.spelling.len()))
    }

    /// Longest quality or extension keyword at the start of `buffer`, with its
    /// byte length.
    ///
    /// Two different spellings of equal length can never both prefix the same
    /// buffer once compilation has rejected duplicates, but the check stays so
    /// a broken table fails loudly instead of resolving by list order.
    pub fn match_keyword(&self, buffer: &str) -> Result<Option<(&Keyword, usize)>, ChordError> {
        let mut matches = self
            .keywords
            .iter()
            .filter(|e| buffer.starts_with(e.spelling.as_str()));
        let Some(best) = matches.next() else {
            return Ok(None);
        };
        if let Some(rival) = matches.next() {
            if spelling_len(&rival.spelling) == spelling_len(&best.spelling)
                && rival.value != best.value
            {
                return Err(ChordError::AmbiguousMatch {
                    spelling: best.spelling.clone(),
                    first: best.value.describe(),
                    second: rival.value.describe(),
                });
            }
        }
        Ok(Some((&best.value, best.spelling.len())))
    }

    /// Whether a tokenizer unit starts with a root spelling, ignoring any
    /// opening ChordPro bracket or parenthesis.
    pub fn looks_like_chord_unit(&self, unit: &str) -> bool {
        let body = unit.trim_start_matches(['[', '(']).trim_start();
        self.root_matches(body).next().is_some()
    }

    /// Canonical spelling of a root with its accidental (`Fa#`, `Fis`, `Sib`).
    pub fn render_pitch(&self, root: &str, accidental: Option<Accidental>) -> String {
        let Some(accidental) = accidental else {
            return root.to_string();
        };
        if let Some(fused) = self.fused_render.get(&(root.to_string(), accidental)) {
            return fused.clone();
        }
        let marker = self
            .accidental_render
            .get(&accidental)
            .map(String::as_str)
            .unwrap_or(match accidental {
                Accidental::Sharp => "#",
                Accidental::Flat => "b",
            });
        format!("{}{}", root, marker)
    }

    /// Output marker for a quality, `None` for major. Qualities a table does
    /// not declare fall back to the common English markers.
    pub fn quality_marker(&self, quality: Quality) -> Option<&str> {
        if quality == Quality::Major {
            return None;
        }
        if let Some(marker) = self.quality_render.get(&quality) {
            return Some(marker.as_str());
        }
        Some(match quality {
            Quality::Minor => "m",
            Quality::Diminished => "dim",
            Quality::Augmented => "aug",
            Quality::Major => unreachable!(),
        })
    }

    /// Every keyword spelling in the table, longest first.
    pub fn keyword_spellings(&self) -> impl Iterator<Item = (&str, &Keyword)> {
        self.keywords.iter().map(|e| (e.spelling.as_str(), &e.value))
    }

    /// Every root spelling in the table, longest first.
    pub fn root_spellings(&self) -> &[RootSpelling] {
        &self.roots
    }
}

fn spelling_len(spelling: &str) -> usize {
    spelling.chars().count()
}

fn sort_longest_first<T>(items: &mut [T], spelling: impl Fn(&T) -> &String) {
    items.sort_by(|a, b| {
        let (a, b) = (spelling(a), spelling(b));
        spelling_len(b).cmp(&spelling_len(a)).then_with(|| a.cmp(b))
    });
}

fn check_spelling(notation: Notation, spelling: &str) -> Result<(), ChordError> {
    if spelling.is_empty() || spelling.chars().any(char::is_whitespace) {
        return Err(ChordError::Grammar(format!(
            "{}: spelling '{}' must be non-empty and contain no whitespace",
            notation, spelling
        )));
    }
    Ok(())
}

fn insert_root(
    roots: &mut Vec<RootSpelling>,
    notation: Notation,
    spelling: &str,
    root: &str,
    accidental: Option<Accidental>,
    implies_minor: bool,
) -> Result<(), ChordError> {
    check_spelling(notation, spelling)?;
    let entry = RootSpelling {
        spelling: spelling.to_string(),
        root: root.to_string(),
        accidental,
        implies_minor,
    };
    if let Some(existing) = roots.iter().find(|r| r.spelling == spelling) {
        if *existing == entry {
            return Ok(());
        }
        return Err(ChordError::AmbiguousMatch {
            spelling: spelling.to_string(),
            first: describe_root(existing),
            second: describe_root(&entry),
        });
    }
    roots.push(entry);
    Ok(())
}

fn describe_root(root: &RootSpelling) -> String {
    let accidental = match root.accidental {
        Some(Accidental::Sharp) => " sharp",
        Some(Accidental::Flat) => " flat",
        None => "",
    };
    let minor = if root.implies_minor { " minor" } else { "" };
    format!("root {}{}{}", root.root, accidental, minor)
}

fn insert_entry<T: PartialEq>(
    entries: &mut Vec<Entry<T>>,
    notation: Notation,
    spelling: &str,
    value: T,
    describe: impl Fn(&T) -> String,
) -> Result<(), ChordError> {
    check_spelling(notation, spelling)?;
    if let Some(existing) = entries.iter().find(|e| e.spelling == spelling) {
        if existing.value == value {
            return Ok(());
        }
        return Err(ChordError::AmbiguousMatch {
            spelling: spelling.to_string(),
            first: describe(&existing.value),
            second: describe(&value),
        });
    }
    entries.push(Entry {
        spelling: spelling.to_string(),
        value,
    });
    Ok(())
}

/// Compiled grammars keyed by notation.
#[derive(Debug, Clone, Default)]
pub struct GrammarSet {
    grammars: BTreeMap<Notation, Grammar>,
}

impl GrammarSet {
    pub fn from_yaml(content: &str) -> Result<Self, ChordError> {
        let raw: RawGrammarSet =
            serde_yaml::from_str(content).map_err(|e| ChordError::Grammar(e.to_string()))?;
        let mut grammars = BTreeMap::new();
        for (notation, raw_grammar) in raw.notations {
            grammars.insert(notation, Grammar::compile(notation, raw_grammar)?);
        }
        tracing::debug!(
            notations = grammars.len(),
            "compiled chord grammar set"
        );
        Ok(Self { grammars })
    }

    /// Built-in tables, parsed once per process and shared read-only.
    pub fn builtin() -> Result<&'static GrammarSet, ChordError> {
        static BUILTIN: OnceLock<Result<GrammarSet, ChordError>> = OnceLock::new();
        match BUILTIN.get_or_init(|| GrammarSet::from_yaml(BUILTIN_GRAMMARS)) {
            Ok(set) => Ok(set),
            Err(e) => Err(e.clone()),
        }
    }

    /// Load grammar tables from a YAML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ChordError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ChordError::Grammar(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Built-in tables with the notations from `path` replacing their
    /// built-in counterparts.
    pub fn load_with_overrides(path: &Path) -> Result<Self, ChordError> {
        let mut set = Self::builtin()?.clone();
        set.merge(Self::load_from_file(path)?);
        Ok(set)
    }

    /// Merge another set into this one, replacing whole notations.
    pub fn merge(&mut self, other: GrammarSet) {
        for (notation, grammar) in other.grammars {
            self.grammars.insert(notation, grammar);
        }
    }

    pub fn get(&self, notation: Notation) -> Result<&Grammar, ChordError> {
        self.grammars
            .get(&notation)
            .ok_or_else(|| ChordError::UnknownNotation(notation.to_string()))
    }

    pub fn notations(&self) -> impl Iterator<Item = Notation> + '_ {
        self.grammars.keys().copied()
    }

    /// Resolve a notation identifier ("it", "croatian", ...) to a normalizer.
    pub fn normalizer(&self, notation_id: &str) -> Result<Normalizer<'_>, ChordError> {
        let notation: Notation = notation_id.parse()?;
        Ok(Normalizer::new(self.get(notation)?))
    }
}
