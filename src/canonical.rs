//! Renders a [`ChordToken`] back into its notation's canonical spelling.
//!
//! Assembly order: root with accidental (never spaced), quality marker,
//! extensions concatenated in stored order, then `/` and the bass. The only
//! spaces ever emitted come from the grammar's `quality-gap` and
//! `word-extension-gap` flags, which is what produces Italian `Re m9` and
//! `Fa maj7` next to `Sol7`.

use crate::chord::{ChordToken, Quality};
use crate::grammar::{Grammar, MinorStyle};

/// Canonical chord text, parenthesized when the token was.
pub fn render(token: &ChordToken, grammar: &Grammar) -> String {
    let pitch = grammar.render_pitch(&token.root, token.accidental);
    let lowercase_minor =
        token.quality == Quality::Minor && grammar.minor_style() == MinorStyle::LowercaseRoot;

    let mut out = if lowercase_minor {
        pitch.to_lowercase()
    } else {
        pitch
    };

    let marker = if lowercase_minor {
        None
    } else {
        grammar.quality_marker(token.quality)
    };

    match marker {
        Some(marker) => {
            if grammar.quality_gap() {
                out.push(' ');
            }
            out.push_str(marker);
        }
        None => {
            let word_first = token
                .extensions
                .first()
                .and_then(|ext| ext.chars().next())
                .is_some_and(char::is_alphabetic);
            if grammar.word_extension_gap() && word_first {
                out.push(' ');
            }
        }
    }

    for extension in &token.extensions {
        out.push_str(extension);
    }

    if let Some(bass) = &token.bass {
        out.push_str(grammar.bass_separator());
        out.push_str(&grammar.render_pitch(&bass.root, bass.accidental));
    }

    if token.parenthesized {
        format!("({})", out)
    } else {
        out
    }
}

/// ChordPro form: `[Re m9]`, or `[(Sol7)]` for parenthesized chords.
pub fn to_chordpro(token: &ChordToken, grammar: &Grammar) -> String {
    format!("[{}]", render(token, grammar))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::Accidental;
    use crate::grammar::GrammarSet;
    use crate::notation::Notation;
    use crate::recognizer::recognize;

    fn grammar(notation: Notation) -> &'static Grammar {
        GrammarSet::builtin().unwrap().get(notation).unwrap()
    }

    #[test]
    fn test_italian_spacing() {
        let it = grammar(Notation::Italian);
        assert_eq!(render(&ChordToken::new("Fa").with_extension("maj7"), it), "Fa maj7");
        assert_eq!(render(&ChordToken::new("Sol").with_extension("7"), it), "Sol7");
        assert_eq!(
            render(
                &ChordToken::new("Re")
                    .with_quality(Quality::Minor)
                    .with_extension("9"),
                it
            ),
            "Re m9"
        );
        assert_eq!(
            render(&ChordToken::new("Sol").with_quality(Quality::Minor), it),
            "Sol m"
        );
        assert_eq!(
            render(
                &ChordToken::new("Fa")
                    .with_accidental(Accidental::Sharp)
                    .with_quality(Quality::Minor),
                it
            ),
            "Fa# m"
        );
        assert_eq!(
            render(
                &ChordToken::new("Si")
                    .with_quality(Quality::Diminished)
                    .with_extension("7"),
                it
            ),
            "Si dim7"
        );
    }

    #[test]
    fn test_parentheses_wrap_without_padding() {
        let it = grammar(Notation::Italian);
        let token = ChordToken::new("Sol").with_extension("7").parenthesized();
        assert_eq!(render(&token, it), "(Sol7)");
        assert_eq!(to_chordpro(&token, it), "[(Sol7)]");
    }

    #[test]
    fn test_spanish_concatenated() {
        let es = grammar(Notation::Spanish);
        let token = ChordToken::new("Mi")
            .with_quality(Quality::Minor)
            .with_extension("6");
        assert_eq!(render(&token, es), "Mi-6");
        let token = ChordToken::new("Si")
            .with_accidental(Accidental::Flat)
            .with_extension("6")
            .with_extension("+5dim");
        assert_eq!(render(&token, es), "Sib6+5dim");
    }

    #[test]
    fn test_german_lowercase_minor() {
        let de = grammar(Notation::German);
        let token = ChordToken::new("F")
            .with_accidental(Accidental::Sharp)
            .with_quality(Quality::Minor)
            .with_extension("7");
        assert_eq!(render(&token, de), "fis7");
        let token = ChordToken::new("E")
            .with_accidental(Accidental::Flat)
            .with_quality(Quality::Minor);
        assert_eq!(render(&token, de), "es");
        assert_eq!(render(&ChordToken::new("H").with_extension("7"), de), "H7");
        let token = ChordToken::new("E").with_accidental(Accidental::Sharp);
        assert_eq!(render(&token, de), "E#");
    }

    #[test]
    fn test_bass_rendered_canonically() {
        let it = grammar(Notation::Italian);
        let token = ChordToken::new("Re")
            .with_quality(Quality::Minor)
            .with_extension("7")
            .with_bass("Fa", Some(Accidental::Sharp));
        assert_eq!(render(&token, it), "Re m7/Fa#");

        let de = grammar(Notation::German);
        let token = ChordToken::new("D").with_bass("F", Some(Accidental::Sharp));
        assert_eq!(render(&token, de), "D/Fis");
    }

    #[test]
    fn test_undeclared_quality_falls_back() {
        // Spanish declares no diminished quality; render stays total.
        let es = grammar(Notation::Spanish);
        let token = ChordToken::new("Do").with_quality(Quality::Diminished);
        assert_eq!(render(&token, es), "Dodim");
    }

    #[test]
    fn test_render_is_idempotent_through_recognize() {
        let samples = [
            (Notation::Italian, "Fa maj 7"),
            (Notation::Italian, "Re m 9"),
            (Notation::Italian, "(Sol 7)"),
            (Notation::Italian, "Do # m maj 7 / Mi"),
            (Notation::Italian, "Si b dim 7"),
            (Notation::Spanish, "Fa#5/9dim"),
            (Notation::Spanish, "Re – 9"),
            (Notation::German, "Es sus 4"),
            (Notation::German, "a sus 2"),
            (Notation::German, "cis 7 / H"),
            (Notation::English, "C m maj7"),
            (Notation::English, "Bb 7b9"),
        ];
        for (notation, text) in samples {
            let g = grammar(notation);
            let once = render(&recognize(text, g).unwrap(), g);
            let twice = render(&recognize(&once, g).unwrap(), g);
            assert_eq!(once, twice, "{} {:?}", notation, text);
        }
    }
}
