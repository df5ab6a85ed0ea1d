//! TOML parser with helpful error messages

use super::schema::InstallerConfig;
use crate::error::ConfigError;
use std::path::Path;

/// Parse keeper.toml with detailed error messages
pub fn parse_keeper_toml(path: &Path) -> Result<InstallerConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_keeper_toml_str(&content).map_err(|err| match err {
        ConfigError::Parse(msg) => {
            ConfigError::Parse(format!("Failed to parse {}: {}", path.display(), msg))
        }
        other => other,
    })
}

/// Parse keeper.toml content from string
pub fn parse_keeper_toml_str(content: &str) -> Result<InstallerConfig, ConfigError> {
    let config: InstallerConfig =
        toml::from_str(content).map_err(|e| enhance_toml_error(e, content))?;

    config.validate()?;

    Ok(config)
}

/// Enhance TOML parsing errors with the offending line and its neighbours
fn enhance_toml_error(error: toml::de::Error, content: &str) -> ConfigError {
    let line_hint = error
        .span()
        .map(|span| content[..span.start.min(content.len())].matches('\n').count() + 1);

    match line_hint {
        Some(line_num) => {
            let context = get_line_context(content, line_num);
            ConfigError::Parse(format!(
                "TOML parsing error at line {}:\n{}\n\nError: {}",
                line_num,
                context,
                error.message()
            ))
        }
        None => ConfigError::Parse(format!("TOML parsing error: {}", error.message())),
    }
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 2).min(lines.len());

    lines[start.min(end)..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
