#![forbid(unsafe_code)]

//! # Formwork CLI
//!
//! Drives the `formwork` engine from the command line: prints a form's
//! defaults, renders it as text or JSON, validates payloads against it and
//! replays scripted inputs before submitting.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p formwork-cli -- render crates/formwork-cli/forms/user.json
//! ```
//!
//! Exit status is `0` on success, `1` on any error and `2` when a payload
//! or a replayed submission fails validation.

mod cli;
mod config;
mod load;
mod script;
mod view;

use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use formwork::{FormEngine, SubmitError, ValidationErrors};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, RenderArgs, ReplayArgs, ValidateArgs};
use config::Config;

const INVALID: u8 = 2;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse_args();
    let config = Config::from_cli(&cli);
    init_tracing(&config);
    if !config.color {
        colored::control::set_override(false);
    }
    debug!(?config, "resolved configuration");

    let detail = load::load_form(cli.command.form())?;
    let engine = FormEngine::new(detail).context("failed to build form")?;

    match &cli.command {
        Command::Defaults(_) => {
            print_json(&engine.compiled().defaults)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Render(args) => render(engine, args, &config),
        Command::Validate(args) => validate(engine, args, &config),
        Command::Replay(args) => replay(engine, args, &config),
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// -----------------------------------------------------------------------------
// Subcommands
// -----------------------------------------------------------------------------

fn render(mut engine: FormEngine, args: &RenderArgs, config: &Config) -> Result<ExitCode> {
    if let Some(values) = &args.values {
        engine.load(&load::load_values(values)?)?;
    }
    if args.show_errors {
        if let Err(errors) = engine.validate() {
            debug!(issues = errors.len(), "rendering with validation errors");
        }
    }
    print_form(&engine, config)?;
    Ok(ExitCode::SUCCESS)
}

fn validate(mut engine: FormEngine, args: &ValidateArgs, config: &Config) -> Result<ExitCode> {
    let payload = load::load_values(&args.payload)?;
    engine.load(&payload)?;
    match engine.validate() {
        Ok(output) => {
            if config.is_json() {
                print_json(&json!({ "valid": true, "payload": output }))?;
            } else {
                println!("valid");
                print_json(&output)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(errors) => {
            print_errors(&errors, config)?;
            Ok(ExitCode::from(INVALID))
        }
    }
}

fn replay(mut engine: FormEngine, args: &ReplayArgs, config: &Config) -> Result<ExitCode> {
    let text = fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read {}", args.script.display()))?;
    let steps = script::parse_script(&text)?;
    script::apply(&mut engine, &steps)?;

    let outcome = engine.submit();
    if args.render {
        print_form(&engine, config)?;
    }
    match outcome {
        Ok(payload) => {
            if config.is_json() {
                print_json(&json!({ "submitted": true, "payload": payload }))?;
            } else {
                println!("submitted");
                print_json(&payload)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(SubmitError::Invalid(errors)) => {
            print_errors(&errors, config)?;
            Ok(ExitCode::from(INVALID))
        }
        Err(err @ SubmitError::Rejected(_)) => Err(err.into()),
    }
}

// -----------------------------------------------------------------------------
// Output
// -----------------------------------------------------------------------------

fn print_form(engine: &FormEngine, config: &Config) -> Result<()> {
    let tree = engine.render();
    if config.is_json() {
        print_json(&tree)
    } else {
        println!("{}", view::render_text(&tree, config.color));
        Ok(())
    }
}

fn print_errors(errors: &ValidationErrors, config: &Config) -> Result<()> {
    if config.is_json() {
        print_json(&json!({ "valid": false, "errors": errors.by_path() }))
    } else {
        println!("{}", view::errors_text(errors, config.color));
        Ok(())
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to encode output")?;
    println!("{text}");
    Ok(())
}

