use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use vocabulary::{convert, ConvertOptions, InvalidEntryPolicy};

mod logging;

/// Converts the hand-written YAML vocabulary into the JSON database.
#[derive(Parser, Debug)]
#[command(name = "gre-data")]
#[command(version)]
struct Cli {
    /// Vocabulary file to parse
    #[arg(long, default_value = "data/vocabs.yaml")]
    input: PathBuf,

    /// Database file to generate
    #[arg(long, default_value = "data/database.json")]
    output: PathBuf,

    /// Pretty-print the generated JSON
    #[arg(long)]
    pretty: bool,

    /// Leave invalid entries out instead of aborting the whole run
    #[arg(long)]
    skip_invalid: bool,
}

impl Cli {
    fn options(self) -> ConvertOptions {
        let policy = if self.skip_invalid {
            InvalidEntryPolicy::Skip
        } else {
            InvalidEntryPolicy::Abort
        };
        ConvertOptions {
            input: self.input,
            output: self.output,
            pretty: self.pretty,
            policy,
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let options = cli.options();
    let report = convert(&options).with_context(|| {
        format!(
            "could not convert {} into {}",
            options.input.display(),
            options.output.display()
        )
    })?;
    info!(
        converted = report.converted,
        skipped = report.skipped.len(),
        "done"
    );
    Ok(())
}

fn main() -> ExitCode {
    logging::init_logging();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
