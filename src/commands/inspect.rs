//! Handler for token inspection.
//!
//! Reads a token, decodes it, and validates it when a key file is
//! configured. The decoded sections and the verdict are printed either
//! as a human-readable report or as a single JSON document.

use std::io::IsTerminal;

use anyhow::Result;
use tracing::debug;

use crate::cli::Cli;
use crate::core::decoder::Token;
use crate::core::key::resolve_key;
use crate::core::options::ValidationConfig;
use crate::core::validator::{Parser, Verdict};
use crate::display::report::{render_human, render_machine};

/// Execute the inspection with the given arguments.
///
/// Returns the verdict so the caller can choose an exit code.
pub fn execute(cli: &Cli) -> Result<Verdict> {
    let raw = cli.token_source().read_with(std::io::stdin().lock())?;
    let token = Token::decode(&raw, cli.padding_rule())?;
    let verdict = validate(&raw, &ValidationConfig::from(cli))?;

    if cli.json {
        let report = render_machine(&token, &verdict, cli.sections());
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let use_color = std::io::stdout().is_terminal();
        print!("{}", render_human(&token, &verdict, cli.sections(), use_color));
    }

    Ok(verdict)
}

/// Compile the options and run them against the configured key.
///
/// Without a key file the result is [`Verdict::Unverifiable`]; the
/// validator is never invoked.
fn validate(raw: &str, config: &ValidationConfig) -> Result<Verdict> {
    let options = config.compile();
    debug!(?options, "compiled validation options");

    let Some(key) = resolve_key(config.key_file.as_deref())? else {
        return Ok(Verdict::Unverifiable);
    };

    let verdict = Parser::new(&options).verify(raw, &key)?;
    debug!(status = verdict.status(), "validation finished");
    Ok(verdict)
}
