pub mod canonical;
pub mod chord;
pub mod dispatcher;
pub mod error;
pub mod grammar;
pub mod notation;
pub mod recognizer;
pub mod tokenizer;

pub use canonical::{render, to_chordpro};
pub use chord::*;
pub use dispatcher::{Chords, Diagnostic, DiagnosticSink, LogSink, Normalizer, SpanReport};
pub use error::*;
pub use grammar::{Grammar, GrammarSet};
pub use notation::Notation;
pub use recognizer::recognize;
pub use tokenizer::Tokenizer;

/// Canonicalize one chord with the built-in grammars.
/// This is the main entry point for single chords.
///
/// ```rust
/// assert_eq!(chordnorm::canonicalize("Famaj7", "it")?, "[Fa maj7]");
/// assert_eq!(chordnorm::canonicalize("(Sol 7)", "it")?, "[(Sol7)]");
/// # Ok::<(), chordnorm::ChordError>(())
/// ```
pub fn canonicalize(chord: &str, notation_id: &str) -> Result<String, ChordError> {
    GrammarSet::builtin()?.normalizer(notation_id)?.canonicalize(chord)
}

/// Normalize a whole chord span with the built-in grammars.
///
/// Candidates that fail recognition are logged and skipped; only an unknown
/// notation or a broken grammar table is an error.
pub fn normalize_span(span: &str, notation_id: &str) -> Result<Vec<String>, ChordError> {
    let normalizer = GrammarSet::builtin()?.normalizer(notation_id)?;
    Ok(normalizer.chords(span, &mut LogSink).collect())
}
