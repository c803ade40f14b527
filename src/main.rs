mod cli;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use clap::Parser;
use miette::{IntoDiagnostic, WrapErr};
use sift::{Query, QueryParser};

use crate::cli::{FieldSpec, Row, Schema};

/// Filter newline-delimited JSON records with a query
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Query to test every record against, e.g. 'age >= 18 && status ≈ act*'
    #[clap(short, long)]
    query: String,

    /// Declare a queryable field and its kind. Kinds: bool, byte, char, short,
    /// int, long, float, double, text, date, datetime, timestamp
    #[clap(short, long = "field", value_name = "NAME:KIND", required = true)]
    fields: Vec<FieldSpec>,

    /// Print the number of matching records instead of the records
    #[clap(short, long)]
    count: bool,

    /// Abort on the first record that cannot be decoded or evaluated
    #[clap(long)]
    strict: bool,

    /// Input file; reads stdin when absent
    file: Option<PathBuf>,
}

fn main() -> miette::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();

    let schema = Schema::new(args.fields).map_err(|e| miette::miette!("{e:#}"))?;
    let parser = QueryParser::new(schema.registry());
    let query = parser.parse(&args.query)?;
    log::info!("filtering with: {}", query);

    let input: Box<dyn BufRead> = match &args.file {
        Some(path) => {
            let file = File::open(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("failed to open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut matched = 0usize;

    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = line.into_diagnostic()?;
        if line.trim().is_empty() {
            continue;
        }

        match evaluate(&schema, &query, &line) {
            Ok(true) => {
                matched += 1;
                if !args.count {
                    writeln!(out, "{line}").into_diagnostic()?;
                }
            }
            Ok(false) => {}
            Err(e) if args.strict => return Err(miette::miette!("line {line_no}: {e:#}")),
            Err(e) => log::warn!("skipping line {line_no}: {e:#}"),
        }
    }

    if args.count {
        writeln!(out, "{matched}").into_diagnostic()?;
    }

    Ok(())
}

fn evaluate(schema: &Schema, query: &Query<Row>, line: &str) -> anyhow::Result<bool> {
    let row = schema.decode(line)?;
    Ok(query.test(&row)?)
}
