//! # Notation Dispatcher
//!
//! Composes tokenizer → recognizer → canonicalizer for one notation.
//!
//! Recognition failures never abort a span: each failed candidate becomes a
//! [`Diagnostic`] handed to a [`DiagnosticSink`], and the stream moves on to
//! the next unit. Hard failures (`UnknownNotation`, grammar errors) happen
//! before any span is touched, when the [`Normalizer`] is built.
//!
//! ## Unit segmentation
//! A unit that fails as a whole but holds several words is regrouped: starting
//! from the left, the longest run of up to [`MAX_CHORD_WORDS`] words that
//! recognizes and is followed by a word starting a root becomes one chord.
//! `"Mi La m"` yields `[Mi]` and `[La m]`, while `"Fa maj 7"` never gets here
//! because it recognizes whole. If any part of the unit cannot be grouped, the
//! unit is reported whole and yields nothing, so `"Fa maj 7x"` fails the same
//! way `"Famaj7x"` does.
//!
//! ## Example
//! ```rust
//! use chordnorm::GrammarSet;
//!
//! let grammars = GrammarSet::builtin()?;
//! let normalizer = grammars.normalizer("it")?;
//! let report = normalizer.normalize("Fa maj7     Sol m     xyz");
//!
//! assert_eq!(report.chords, vec!["[Fa maj7]", "[Sol m]"]);
//! assert!(report.diagnostics.is_empty()); // "xyz" has no root, the tokenizer drops it
//! # Ok::<(), chordnorm::ChordError>(())
//! ```

use std::collections::VecDeque;

use crate::canonical::to_chordpro;
use crate::error::ChordError;
use crate::grammar::Grammar;
use crate::notation::Notation;
use crate::recognizer::recognize;
use crate::tokenizer::Tokenizer;

/// Longest word group tried when regrouping a failed unit.
pub const MAX_CHORD_WORDS: usize = 4;

/// A candidate that could not be recognized.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub notation: Notation,
    pub candidate: String,
    pub error: ChordError,
}

/// Receives per-candidate recognition failures.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Logs diagnostics through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        match &diagnostic.error {
            ChordError::AmbiguousMatch { .. } => tracing::error!(
                notation = %diagnostic.notation,
                candidate = %diagnostic.candidate,
                "{}",
                diagnostic.error
            ),
            _ => tracing::warn!(
                notation = %diagnostic.notation,
                candidate = %diagnostic.candidate,
                "{}",
                diagnostic.error
            ),
        }
    }
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Canonical chords of one span plus everything that failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpanReport {
    pub chords: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Normalization pipeline bound to one notation's grammar.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'g> {
    grammar: &'g Grammar,
}

impl<'g> Normalizer<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    pub fn notation(&self) -> Notation {
        self.grammar.notation()
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Canonicalize one chord, in ChordPro brackets.
    pub fn canonicalize(&self, chord: &str) -> Result<String, ChordError> {
        let token = recognize(chord, self.grammar)?;
        Ok(to_chordpro(&token, self.grammar))
    }

    /// Lazy stream of canonical chords in `span`, failures going to `sink`.
    pub fn chords<'a, S: DiagnosticSink>(&self, span: &'a str, sink: &'a mut S) -> Chords<'a, S>
    where
        'g: 'a,
    {
        Chords {
            grammar: self.grammar,
            units: Tokenizer::new(span, self.grammar),
            pending: VecDeque::new(),
            sink,
        }
    }

    /// Collect every chord and diagnostic of `span`.
    pub fn normalize(&self, span: &str) -> SpanReport {
        let mut diagnostics = Vec::new();
        let chords = self.chords(span, &mut diagnostics).collect();
        SpanReport {
            chords,
            diagnostics,
        }
    }
}

/// Iterator returned by [`Normalizer::chords`].
pub struct Chords<'a, S: DiagnosticSink> {
    grammar: &'a Grammar,
    units: Tokenizer<'a>,
    pending: VecDeque<String>,
    sink: &'a mut S,
}

impl<'a, S: DiagnosticSink> Chords<'a, S> {
    fn process(&mut self, unit: &str) {
        let error = match recognize(unit, self.grammar) {
            Ok(token) => {
                self.pending.push_back(to_chordpro(&token, self.grammar));
                return;
            }
            Err(error) => error,
        };

        let multi_word = unit.split_whitespace().nth(1).is_some();
        if matches!(error, ChordError::NotAChord { .. }) && multi_word {
            self.segment(unit, error);
        } else {
            self.report(unit, error);
        }
    }

    fn segment(&mut self, unit: &str, whole_error: ChordError) {
        let grammar = self.grammar;
        let words: Vec<&str> = unit.split_whitespace().collect();
        // a group may only end where the next word starts a root spelling
        let boundary =
            |end: usize| end == words.len() || grammar.looks_like_chord_unit(words[end]);

        let mut found = Vec::new();
        let mut start = 0;
        while start < words.len() {
            let longest = (words.len() - start).min(MAX_CHORD_WORDS);
            let matched = (1..=longest).rev().find_map(|count| {
                let end = start + count;
                if count == words.len() || !boundary(end) {
                    return None;
                }
                let group = words[start..end].join(" ");
                recognize(&group, grammar).ok().map(|token| (count, token))
            });
            let Some((count, token)) = matched else {
                self.report(unit, whole_error);
                return;
            };
            found.push(to_chordpro(&token, grammar));
            start += count;
        }

        tracing::debug!(unit, chords = found.len(), "regrouped chord unit");
        self.pending.extend(found);
    }

    fn report(&mut self, candidate: &str, error: ChordError) {
        self.sink.report(Diagnostic {
            notation: self.grammar.notation(),
            candidate: candidate.to_string(),
            error,
        });
    }
}

impl<'a, S: DiagnosticSink> Iterator for Chords<'a, S> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(chord) = self.pending.pop_front() {
                return Some(chord);
            }
            let unit = self.units.next()?;
            self.process(unit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarSet;

    fn normalizer(id: &str) -> Normalizer<'static> {
        GrammarSet::builtin().unwrap().normalizer(id).unwrap()
    }

    #[test]
    fn test_two_units_two_chords() {
        let report = normalizer("it").normalize("Fa maj7     Sol m");
        assert_eq!(report.chords, vec!["[Fa maj7]", "[Sol m]"]);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_failed_candidate_does_not_abort_span() {
        let report = normalizer("it").normalize("Re m 9     Do xyz     (Sol 7)");
        assert_eq!(report.chords, vec!["[Re m9]", "[(Sol7)]"]);
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic {
                notation: Notation::Italian,
                candidate: "Do xyz".to_string(),
                error: ChordError::NotAChord {
                    candidate: "Do xyz".to_string(),
                    leftover: Some("xyz".to_string()),
                },
            }]
        );
    }

    #[test]
    fn test_bad_chord_is_not_truncated() {
        for text in ["Fa maj 7x", "Famaj7x", "Re m 9x", "Sol 7 +"] {
            let report = normalizer("it").normalize(text);
            assert!(report.chords.is_empty(), "{:?} gave {:?}", text, report.chords);
            assert_eq!(report.diagnostics.len(), 1, "{:?}", text);
            assert_eq!(report.diagnostics[0].candidate, text);
            assert!(matches!(
                report.diagnostics[0].error,
                ChordError::NotAChord { leftover: Some(_), .. }
            ));
        }
    }

    #[test]
    fn test_partial_regrouping_rejected() {
        // "Mi" would group, but "La mx" cannot
        let report = normalizer("it").normalize("Mi La mx");
        assert!(report.chords.is_empty());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].candidate, "Mi La mx");
    }

    #[test]
    fn test_whole_unit_failure_reported_once() {
        let report = normalizer("it").normalize("Doxyz");
        assert!(report.chords.is_empty());
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic {
                notation: Notation::Italian,
                candidate: "Doxyz".to_string(),
                error: ChordError::NotAChord {
                    candidate: "Doxyz".to_string(),
                    leftover: Some("xyz".to_string()),
                },
            }]
        );
    }

    #[test]
    fn test_regroups_merged_chord_words() {
        let report = normalizer("it").normalize("Mi La m     Mi 7         La m");
        assert_eq!(report.chords, vec!["[Mi]", "[La m]", "[Mi7]", "[La m]"]);
        assert!(report.diagnostics.is_empty());

        let report = normalizer("it").normalize("Re m Fa Sol");
        assert_eq!(report.chords, vec!["[Re m]", "[Fa]", "[Sol]"]);
    }

    #[test]
    fn test_spanish_chain() {
        let report = normalizer("es").normalize("Do |Mi– |Fa");
        assert_eq!(report.chords, vec!["[Do]", "[Mi-]", "[Fa]"]);
    }

    #[test]
    fn test_lazy_stream_with_sink() {
        let n = normalizer("de");
        let mut sink = Vec::new();
        let mut chords = n.chords("H 7     fis     Cx", &mut sink);
        assert_eq!(chords.next().as_deref(), Some("[H7]"));
        assert_eq!(chords.next().as_deref(), Some("[fis]"));
        assert_eq!(chords.next(), None);
        drop(chords);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].candidate, "Cx");
    }

    #[test]
    fn test_canonicalize_single() {
        let n = normalizer("it");
        assert_eq!(n.canonicalize("Famaj7").unwrap(), "[Fa maj7]");
        assert!(matches!(
            n.canonicalize("Gloria"),
            Err(ChordError::NotAChord { .. })
        ));
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_log_sink_levels() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut sink = LogSink;
            sink.report(Diagnostic {
                notation: Notation::English,
                candidate: "Cx".to_string(),
                error: ChordError::NotAChord {
                    candidate: "Cx".to_string(),
                    leftover: Some("x".to_string()),
                },
            });
            sink.report(Diagnostic {
                notation: Notation::English,
                candidate: "Cm".to_string(),
                error: ChordError::AmbiguousMatch {
                    spelling: "m".to_string(),
                    first: "quality minor".to_string(),
                    second: "extension m".to_string(),
                },
            });
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2, "{}", output);
        assert!(lines[0].contains("WARN"), "{}", lines[0]);
        assert!(lines[0].contains("candidate=Cx"), "{}", lines[0]);
        assert!(lines[0].contains("Not a chord: 'Cx' (unrecognized 'x')"));
        assert!(lines[1].contains("ERROR"), "{}", lines[1]);
        assert!(lines[1].contains("notation=english"), "{}", lines[1]);
    }
}
