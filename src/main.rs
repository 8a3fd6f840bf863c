//! Binary entry point — the `readback` command.
//!
//! # Invocation
//!
//! ```text
//! readback init                      bootstrap the database, seed prompts
//! readback play 2                    speak prompt 2's target sentence
//! readback evaluate 2                record 5 s, transcribe, score, persist
//! readback batch ./recordings        evaluate rec<id>.wav files
//! ```
//!
//! Each outcome is exactly one line of JSON on stdout. Result objects that
//! carry an error tag a caller is expected to branch on (`prompt_not_found`,
//! `unknown_command`) still exit 0; genuine failures (usage errors, capture,
//! transcription or persistence problems) exit non-zero.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use serde_json::json;

use readback::audio::CpalRecorder;
use readback::cli::{error_object, parse_error_object, parse_error_tag, Cli, Command};
use readback::config::AppConfig;
use readback::eval::{discover_recordings, run_batch, EvalError, Evaluator};
use readback::store::{RecordStore, DEFAULT_PROMPTS};
use readback::stt::{TranscribeParams, WhisperTranscriber};
use readback::tts::{Speaker, SystemSpeaker};

/// Print one value as one line of JSON on stdout.
fn emit<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{line}"),
        Err(e) => log::error!("failed to serialise result object: {e}"),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let tag = parse_error_tag(&err);
            emit(&parse_error_object(&err));
            // An unrecognized command is an answer, not a failure.
            return if tag == "unknown_command" {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            };
        }
    };

    run(cli)
}

fn run(cli: Cli) -> ExitCode {
    // Configuration — missing file means defaults, a broken file is logged.
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    if let Some(path) = cli.db {
        config.database.path = Some(path);
    }

    let db_path = config.database_path();
    let store = match RecordStore::open(&db_path) {
        Ok(store) => store,
        Err(e) => {
            emit(&error_object("store_failed", e.to_string()));
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Init => match store.seed_prompts(&DEFAULT_PROMPTS) {
            Ok(seeded) => {
                emit(&json!({
                    "initialized": true,
                    "db": db_path.display().to_string(),
                    "seeded": seeded,
                }));
                ExitCode::SUCCESS
            }
            Err(e) => {
                emit(&error_object("store_failed", e.to_string()));
                ExitCode::FAILURE
            }
        },

        Command::Play { prompt_id } => play(&store, &config, prompt_id),

        Command::Evaluate {
            prompt_id,
            duration,
        } => {
            if let Some(secs) = duration {
                config.audio.record_secs = secs;
            }

            let evaluator = build_evaluator(&store, &config);
            match evaluator.evaluate(prompt_id) {
                Ok(record) => {
                    emit(&record);
                    ExitCode::SUCCESS
                }
                Err(e) => eval_failure(prompt_id, e),
            }
        }

        Command::Batch { dir } => {
            let prompts = match store.prompts() {
                Ok(prompts) => prompts,
                Err(e) => {
                    emit(&error_object("store_failed", e.to_string()));
                    return ExitCode::FAILURE;
                }
            };

            let evaluator = build_evaluator(&store, &config);
            let items = discover_recordings(&dir, &prompts);
            log::info!("batch: {} recordings under {}", items.len(), dir.display());

            for report in run_batch(&evaluator, items) {
                match report.outcome {
                    Ok(record) => emit(&record),
                    Err(e) => emit(&json!({
                        "error": e.tag(),
                        "prompt_id": report.prompt_id,
                        "message": e.to_string(),
                    })),
                }
            }
            ExitCode::SUCCESS
        }
    }
}

fn build_evaluator<'s>(store: &'s RecordStore, config: &AppConfig) -> Evaluator<'s> {
    let params = TranscribeParams {
        language: config.stt.language.clone(),
        ..TranscribeParams::default()
    };
    // The model loads lazily inside the transcriber on first use.
    let transcriber = WhisperTranscriber::new(config.model_path(), params);

    Evaluator::new(
        store,
        Arc::new(CpalRecorder::new()),
        Arc::new(transcriber),
        config,
    )
}

fn play(store: &RecordStore, config: &AppConfig, prompt_id: i64) -> ExitCode {
    let text = match store.expected_text(prompt_id) {
        Ok(Some(text)) => text,
        Ok(None) => {
            emit(&json!({ "error": "prompt_not_found", "prompt_id": prompt_id }));
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            emit(&error_object("store_failed", e.to_string()));
            return ExitCode::FAILURE;
        }
    };

    match SystemSpeaker::from_config(&config.tts).speak(&text) {
        Ok(()) => {
            emit(&json!({ "prompt_id": prompt_id, "prompt_text": text }));
            ExitCode::SUCCESS
        }
        Err(e) => {
            emit(&error_object("tts_failed", e.to_string()));
            ExitCode::FAILURE
        }
    }
}

fn eval_failure(prompt_id: i64, e: EvalError) -> ExitCode {
    emit(&json!({
        "error": e.tag(),
        "prompt_id": prompt_id,
        "message": e.to_string(),
    }));
    match e {
        // A caller asking about a prompt that does not exist got its answer.
        EvalError::PromptNotFound(_) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
