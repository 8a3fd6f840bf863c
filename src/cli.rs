//! Command surface — argument parsing and single-line JSON result objects.
//!
//! Every invocation prints exactly one line of JSON per outcome so a calling
//! process (GUI shell, test harness) can parse results deterministically.
//! Parse failures are mapped onto stable error tags instead of clap's
//! human-readable usage text:
//!
//! | Failure                      | Tag                 |
//! |------------------------------|---------------------|
//! | unrecognized subcommand      | `unknown_command`   |
//! | non-numeric prompt id        | `invalid_prompt_id` |
//! | anything else                | `usage`             |

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Cli
// ---------------------------------------------------------------------------

/// Pronunciation trainer for radio phraseology.
#[derive(Debug, Parser)]
#[command(name = "readback", version)]
pub struct Cli {
    /// Settings file (defaults to the platform config directory).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Database file (overrides the settings file).
    #[arg(long, value_name = "FILE")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the database schema and seed the stock prompts.
    Init,

    /// Speak a prompt's target sentence aloud.
    Play {
        /// Numeric prompt id.
        prompt_id: i64,
    },

    /// Record one spoken attempt and evaluate it.
    Evaluate {
        /// Numeric prompt id.
        prompt_id: i64,

        /// Override the recording length in seconds.
        #[arg(long)]
        duration: Option<u32>,
    },

    /// Evaluate pre-recorded rec<id>.wav files from a directory.
    Batch {
        /// Directory containing the recordings.
        dir: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Error objects
// ---------------------------------------------------------------------------

/// Map a clap parse failure onto a stable error tag.
pub fn parse_error_tag(err: &clap::Error) -> &'static str {
    match err.kind() {
        ErrorKind::InvalidSubcommand => "unknown_command",
        ErrorKind::ValueValidation | ErrorKind::InvalidValue => "invalid_prompt_id",
        _ => "usage",
    }
}

/// Build a `{"error": tag, "message": …}` object.
pub fn error_object(tag: &str, message: impl Into<String>) -> Value {
    json!({ "error": tag, "message": message.into() })
}

/// The single-line result object for a parse failure.
pub fn parse_error_object(err: &clap::Error) -> Value {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("").to_string();
    error_object(parse_error_tag(err), first_line)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_parses_numeric_prompt_id() {
        let cli = Cli::try_parse_from(["readback", "play", "3"]).unwrap();
        match cli.command {
            Command::Play { prompt_id } => assert_eq!(prompt_id, 3),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn evaluate_accepts_duration_override() {
        let cli =
            Cli::try_parse_from(["readback", "evaluate", "2", "--duration", "8"]).unwrap();
        match cli.command {
            Command::Evaluate {
                prompt_id,
                duration,
            } => {
                assert_eq!(prompt_id, 2);
                assert_eq!(duration, Some(8));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unrecognized_subcommand_maps_to_unknown_command() {
        let err = Cli::try_parse_from(["readback", "bogus", "1"]).unwrap_err();
        assert_eq!(parse_error_tag(&err), "unknown_command");
    }

    #[test]
    fn non_numeric_prompt_id_maps_to_invalid_prompt_id() {
        let err = Cli::try_parse_from(["readback", "play", "abc"]).unwrap_err();
        assert_eq!(parse_error_tag(&err), "invalid_prompt_id");
    }

    #[test]
    fn missing_arguments_map_to_usage() {
        for args in [vec!["readback"], vec!["readback", "play"]] {
            let err = Cli::try_parse_from(args).unwrap_err();
            assert_eq!(parse_error_tag(&err), "usage");
        }
    }

    #[test]
    fn error_objects_are_single_line() {
        let err = Cli::try_parse_from(["readback"]).unwrap_err();
        let line = parse_error_object(&err).to_string();
        assert!(!line.contains('\n'));
        assert!(line.starts_with(r#"{"error":"usage""#));
    }
}
