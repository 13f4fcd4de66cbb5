//! Splits a raw chord span into candidate chord units.
//!
//! OCR'd chord lines separate distinct chords with wide whitespace runs
//! (`"Fa maj7     Sol m"`) while a single chord may carry a few stray spaces
//! (`"Fa maj 7"`). Only runs of at least the grammar's column gap split, plus
//! any explicit separators the notation declares. Units that do not start with
//! a root spelling are dropped as lyric noise.

use crate::grammar::Grammar;

/// Lazy, restartable sequence of candidate units in span order.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    rest: &'a str,
    grammar: &'a Grammar,
}

impl<'a> Tokenizer<'a> {
    pub fn new(span: &'a str, grammar: &'a Grammar) -> Self {
        Self {
            rest: span,
            grammar,
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        while !self.rest.is_empty() {
            let (unit, rest) = split_unit(
                self.rest,
                self.grammar.column_gap(),
                self.grammar.separators(),
            );
            self.rest = rest;

            let unit = unit.trim();
            if unit.is_empty() {
                continue;
            }
            if self.grammar.looks_like_chord_unit(unit) {
                return Some(unit);
            }
            tracing::trace!(unit, notation = %self.grammar.notation(), "dropping non-chord unit");
        }
        None
    }
}

/// Split off the first unit of `text`, returning it and the remainder after
/// the boundary (the whitespace run or separator is consumed).
fn split_unit<'a>(text: &'a str, column_gap: usize, separators: &[String]) -> (&'a str, &'a str) {
    let mut run_start = None;
    let mut run_len = 0;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            run_start.get_or_insert(i);
            run_len += 1;
            continue;
        }
        if let Some(start) = run_start.take() {
            if run_len >= column_gap {
                return (&text[..start], &text[i..]);
            }
        }
        run_len = 0;

        let rest = &text[i..];
        if let Some(sep) = separators.iter().find(|s| rest.starts_with(s.as_str())) {
            return (&text[..i], &rest[sep.len()..]);
        }
    }
    (text, "")
}
