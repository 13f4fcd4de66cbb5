use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use chordnorm::{GrammarSet, LogSink, SpanReport};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Canonicalize OCR'd chord spans, one span per input line.
#[derive(Parser, Debug)]
#[command(name = "chordnorm", version, about)]
struct Cli {
    /// Notation or language identifier (it, es, de, sl, hr, en, ...)
    #[arg(short = 'n', long)]
    notation: String,

    /// Input file (reads from stdin if not provided)
    file: Option<PathBuf>,

    /// YAML grammar tables merged over the built-in ones
    #[arg(short = 'g', long, value_name = "FILE")]
    grammar: Option<PathBuf>,

    /// Emit one JSON object per span, diagnostics included
    #[arg(long)]
    json: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let stdout = io::stdout();
    if let Err(e) = run(&cli, &mut stdout.lock()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Normalize every input line to `out`. Only I/O, grammar and notation
/// errors are returned; chords that fail recognition are reported and skipped.
fn run(cli: &Cli, out: &mut impl Write) -> Result<(), Box<dyn std::error::Error>> {
    let source = match &cli.file {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("Error reading file '{}': {}", path.display(), e))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let custom;
    let grammars = match &cli.grammar {
        Some(path) => {
            custom = GrammarSet::load_with_overrides(path)?;
            &custom
        }
        None => GrammarSet::builtin()?,
    };
    let normalizer = grammars.normalizer(&cli.notation)?;

    for span in source.lines() {
        if cli.json {
            writeln!(out, "{}", span_json(span, &normalizer.normalize(span)))?;
        } else {
            let chords: Vec<String> = normalizer.chords(span, &mut LogSink).collect();
            writeln!(out, "{}", chords.join(" "))?;
        }
    }
    Ok(())
}

fn span_json(span: &str, report: &SpanReport) -> serde_json::Value {
    let diagnostics: Vec<_> = report
        .diagnostics
        .iter()
        .map(|d| {
            serde_json::json!({
                "candidate": d.candidate,
                "error": d.error.to_string(),
            })
        })
        .collect();
    serde_json::json!({
        "span": span,
        "chords": report.chords,
        "diagnostics": diagnostics,
    })
}
