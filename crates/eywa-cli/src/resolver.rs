//! Resolution of parameters missing from the command line.
//!
//! With a terminal on stdin, missing values are prompted for; without
//! one, they are hard errors so scripted invocations never hang on a
//! prompt.

use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;

use crate::context::{CliError, CliResult};

/// Supplies values the command line left out. `Sync` so handler futures
/// holding a resolver stay `Send`.
pub(crate) trait ParamResolver: Sync {
    /// Produces a value for the named missing parameter.
    fn resolve(&self, name: &str) -> CliResult<String>;

    /// Produces a secret (read without echo) for the named parameter.
    fn secret(&self, name: &str) -> CliResult<String>;

    /// Asks a yes/no question before a destructive operation.
    fn confirm(&self, prompt: &str) -> CliResult<bool>;
}

/// Interactive resolver used when stdin is a terminal.
pub(crate) struct PromptResolver;

impl ParamResolver for PromptResolver {
    fn resolve(&self, name: &str) -> CliResult<String> {
        print!("{name}: ");
        io::stdout()
            .flush()
            .map_err(|err| CliError::failure(anyhow!("failed to write prompt: {err}")))?;
        let mut line = String::new();
        io::stdin()
            .read_line(&mut line)
            .map_err(|err| CliError::failure(anyhow!("failed to read {name}: {err}")))?;
        let value = line.trim().to_string();
        if value.is_empty() {
            return Err(CliError::validation(format!("{name} must not be empty")));
        }
        Ok(value)
    }

    fn secret(&self, name: &str) -> CliResult<String> {
        let value = rpassword::prompt_password(format!("{name}: "))
            .map_err(|err| CliError::failure(anyhow!("failed to read {name}: {err}")))?;
        if value.is_empty() {
            return Err(CliError::validation(format!("{name} must not be empty")));
        }
        Ok(value)
    }

    fn confirm(&self, prompt: &str) -> CliResult<bool> {
        print!("{prompt} (yes/no): ");
        io::stdout()
            .flush()
            .map_err(|err| CliError::failure(anyhow!("failed to write prompt: {err}")))?;
        let mut line = String::new();
        io::stdin()
            .read_line(&mut line)
            .map_err(|err| CliError::failure(anyhow!("failed to read answer: {err}")))?;
        Ok(line.trim().eq_ignore_ascii_case("yes"))
    }
}

/// Non-interactive resolver: every missing value is an error.
pub(crate) struct StrictResolver;

impl ParamResolver for StrictResolver {
    fn resolve(&self, name: &str) -> CliResult<String> {
        Err(CliError::validation(format!(
            "{name} is required (stdin is not a terminal, so it cannot be prompted for)"
        )))
    }

    fn secret(&self, name: &str) -> CliResult<String> {
        self.resolve(name)
    }

    fn confirm(&self, _prompt: &str) -> CliResult<bool> {
        Err(CliError::validation(
            "confirmation required; pass --yes when stdin is not a terminal".to_string(),
        ))
    }
}

/// Picks the resolver matching the current stdin.
pub(crate) fn stdin_resolver() -> Box<dyn ParamResolver> {
    if io::stdin().is_terminal() {
        Box::new(PromptResolver)
    } else {
        Box::new(StrictResolver)
    }
}

/// Uses the given value when present and non-blank, otherwise falls back
/// to the resolver.
pub(crate) fn require(
    value: Option<String>,
    name: &str,
    resolver: &dyn ParamResolver,
) -> CliResult<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => resolver.resolve(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_passes_through_present_values() {
        let value = require(Some("ch-1".to_string()), "channel id", &StrictResolver).unwrap();
        assert_eq!(value, "ch-1");
    }

    #[test]
    fn require_rejects_blank_values_in_strict_mode() {
        let err = require(Some("  ".to_string()), "channel id", &StrictResolver).unwrap_err();
        assert!(matches!(err, CliError::Validation(message) if message.contains("channel id")));
    }

    #[test]
    fn strict_confirmation_points_at_the_yes_flag() {
        let err = StrictResolver.confirm("Delete?").unwrap_err();
        assert!(matches!(err, CliError::Validation(message) if message.contains("--yes")));
    }
}
