//! # run
//!
//! Executes a bill script against a fresh bill built from the config.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::commands::OutputFormat;
use crate::error::{CliError, CliResult};
use crate::output::{write_error, write_outcome};
use crate::script::ScriptRunner;
use crate::state::{AppConfig, BillState, Session};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Script file, one command per line
    #[arg(short, long)]
    pub script: PathBuf,

    /// Report failing lines and carry on
    #[arg(long)]
    pub keep_going: bool,

    /// Starting discount percent (default from config)
    #[arg(short, long)]
    pub discount: Option<f64>,
}

/// Results go to `out`; with `--keep-going`, failed lines go to `errors`.
pub fn execute<W: Write, E: Write>(
    args: &RunArgs,
    config: &AppConfig,
    format: OutputFormat,
    out: &mut W,
    errors: &mut E,
) -> CliResult<()> {
    let text = std::fs::read_to_string(&args.script)?;
    run_text(&text, args, config, format, out, errors)
}

pub(crate) fn run_text<W: Write, E: Write>(
    text: &str,
    args: &RunArgs,
    config: &AppConfig,
    format: OutputFormat,
    out: &mut W,
    errors: &mut E,
) -> CliResult<()> {
    let discount = args
        .discount
        .map(|pct| pct / 100.0)
        .unwrap_or_else(|| config.default_discount());
    let session = Session::new(config.new_bill()?, discount)?;
    let runner = ScriptRunner::new(BillState::new(session), config);

    let mut write_failure: Option<CliError> = None;
    let result = runner.run(text, args.keep_going, |_, result| {
        let written = match result {
            Ok(outcome) => write_outcome(out, outcome, format, config),
            Err(err) => write_error(errors, err, format).map_err(CliError::from),
        };
        if let Err(e) = written {
            write_failure.get_or_insert(e);
        }
    });

    if let Some(e) = write_failure {
        return Err(e);
    }
    let summary = result?;
    info!(script = %args.script.display(), executed = summary.executed, "Script complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn args(keep_going: bool) -> RunArgs {
        RunArgs {
            script: PathBuf::from("inline"),
            keep_going,
            discount: None,
        }
    }

    #[test]
    fn test_outputs_in_order() {
        let mut out = Vec::new();
        let mut errors = Vec::new();
        run_text(
            "participant add Alice\nitem add Tea 2.00\ncalc",
            &args(false),
            &AppConfig::default(),
            OutputFormat::Table,
            &mut out,
            &mut errors,
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Added participant 'Alice'"));
        assert_eq!(lines.next(), Some("Added item 'Tea'"));
        assert!(text.lines().any(|l| l.starts_with("Alice") && l.ends_with("$2.00")));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_keep_going_reports_to_errors() {
        let mut out = Vec::new();
        let mut errors = Vec::new();
        let err = run_text(
            "participant add Alice\nitem add Tea 2.00 for=Zed\nlist",
            &args(true),
            &AppConfig::default(),
            OutputFormat::Json,
            &mut out,
            &mut errors,
        )
        .unwrap_err();

        assert_eq!(err.code(), ErrorCode::NotFound);
        let reported: serde_json::Value = serde_json::from_slice(&errors).unwrap();
        assert_eq!(reported["code"], "NOT_FOUND");
        assert_eq!(reported["message"], "Line 2: Participant not found: Zed");
    }
}
