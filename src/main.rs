//! Purpose: `wirebox` CLI entry point for checking literals, decimals and parameter files.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Commands emit one JSON document on stdout per invocation.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: Diagnostics from `tracing` go to stderr and never mix with command output.
use std::error::Error as StdError;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;

use wirebox::api::{Error, ErrorKind, to_exit_code};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Try `wirebox --help`."));
            }
        },
    };

    command_dispatch::dispatch_command(cli.command)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "wirebox",
    version,
    about = "Check wire literals, decimals and parameter files",
    after_help = r#"EXAMPLES
  $ wirebox text u32 4294967295
  $ wirebox text timestamp 2024-01-02T03:04:05.500+01:00
  $ wirebox decimal 2.675 --scale 2 --rounding half-up
  $ wirebox params ./service.params.json

Set RUST_LOG=debug for diagnostics on stderr."#,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Parse a literal with a holder kind's text codec and print its canonical form")]
    Text {
        #[arg(help = "Holder kind (i8..i64, u8..u64, bool, string, decimal, big_int, timestamp, array, object)")]
        kind: String,
        #[arg(help = "Literal in the kind's text grammar", allow_negative_numbers = true)]
        literal: String,
    },
    #[command(about = "Parse a decimal literal, optionally rescale it, and print its parts")]
    Decimal {
        #[arg(help = "Decimal literal (e.g. -12.50)", allow_negative_numbers = true)]
        literal: String,
        #[arg(long, help = "Target scale (digits after the point)")]
        scale: Option<u32>,
        #[arg(
            long,
            default_value = "half-even",
            help = "Rounding when reducing scale: half-even|half-up|half-down|down|up|ceiling|floor|05up"
        )]
        rounding: String,
        #[arg(long, help = "Strip trailing fractional zeros", conflicts_with = "scale")]
        normalize: bool,
    },
    #[command(about = "Load a JSON parameter file and print it in canonical form")]
    Params {
        #[arg(help = "Path to the parameter file", value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_error(err: &Error) {
    let report = ErrorReport::from_error(err);
    if io::stderr().is_terminal() {
        eprintln!("{}", report.to_text());
        return;
    }

    let json = serde_json::to_string(&report.to_json()).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

/// Flattened error shared by the JSON envelope and the terminal rendering.
struct ErrorReport {
    kind: ErrorKind,
    message: String,
    hint: Option<String>,
    offset: Option<u64>,
    causes: Vec<String>,
}

impl ErrorReport {
    fn from_error(err: &Error) -> Self {
        let mut causes = Vec::new();
        let mut next = err.source();
        while let Some(cause) = next {
            causes.push(cause.to_string());
            next = cause.source();
        }
        Self {
            kind: err.kind(),
            message: err
                .message()
                .unwrap_or_else(|| kind_summary(err.kind()))
                .to_string(),
            hint: err.hint().map(str::to_string),
            offset: err.offset(),
            causes,
        }
    }

    fn to_json(&self) -> Value {
        let mut body = json!({
            "kind": format!("{:?}", self.kind),
            "message": self.message,
        });
        if let Some(hint) = &self.hint {
            body["hint"] = json!(hint);
        }
        if let Some(offset) = self.offset {
            body["offset"] = json!(offset);
        }
        if !self.causes.is_empty() {
            body["causes"] = json!(self.causes);
        }
        json!({ "error": body })
    }

    fn to_text(&self) -> String {
        let mut lines = vec![format!("error: {}", self.message)];
        lines.extend(self.hint.iter().map(|hint| format!("hint: {hint}")));
        lines.extend(self.offset.iter().map(|offset| format!("offset: {offset}")));
        lines.extend(self.causes.iter().map(|cause| format!("caused by: {cause}")));
        lines.join("\n")
    }
}

fn kind_summary(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::OutOfBounds => "access past the end of the buffer",
        ErrorKind::MalformedEncoding => "malformed encoding",
        ErrorKind::UnboundView => "view is not bound",
        ErrorKind::InvalidNumericLiteral => "invalid numeric literal",
        ErrorKind::InvalidScale => "invalid scale",
        ErrorKind::OutOfRange => "value out of range",
        ErrorKind::InvalidType => "invalid type",
        ErrorKind::InvalidTimestamp => "invalid timestamp",
        ErrorKind::NoServerReachable => "no server reachable",
        ErrorKind::InvalidCallState => "invalid call state",
        ErrorKind::Usage => "usage error",
        ErrorKind::Io => "i/o error",
        ErrorKind::Internal => "internal error",
    }
}

/// First non-empty line of clap's rendering, without its `error:` label.
fn clap_error_summary(err: &clap::Error) -> String {
    err.to_string()
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.strip_prefix("error:").unwrap_or(line).trim().to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}

#[cfg(test)]
mod tests {
    use super::ErrorReport;
    use wirebox::api::{Error, ErrorKind};

    #[test]
    fn json_envelope_carries_kind_hint_and_causes() {
        let err = Error::new(ErrorKind::OutOfRange)
            .with_message("cannot parse \"256\"")
            .with_hint("expected u8")
            .with_source(std::io::Error::other("inner"));
        let value = ErrorReport::from_error(&err).to_json();
        assert_eq!(value["error"]["kind"], "OutOfRange");
        assert_eq!(value["error"]["message"], "cannot parse \"256\"");
        assert_eq!(value["error"]["hint"], "expected u8");
        assert_eq!(value["error"]["causes"][0], "inner");
        assert!(value["error"].get("offset").is_none());
    }

    #[test]
    fn terminal_text_falls_back_to_kind_summary() {
        let report = ErrorReport::from_error(&Error::new(ErrorKind::UnboundView).with_offset(12));
        assert_eq!(report.to_text(), "error: view is not bound\noffset: 12");
        assert_eq!(report.to_json()["error"]["offset"], 12);
    }
}
