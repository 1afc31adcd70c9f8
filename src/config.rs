use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use toml::Value;

#[derive(Debug, Clone)]
pub struct FormatConfig {
    pub indent_size: usize,
    pub indent_char: char,
    pub indent_level: usize,
    pub preserve_newlines: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent_size: 4,
            indent_char: ' ',
            indent_level: 0,
            preserve_newlines: false,
        }
    }
}

impl FormatConfig {
    /// Builds a config from a loosely typed options table. Values that do
    /// not coerce keep their defaults; unknown keys are ignored.
    pub fn from_value(value: &Value) -> Self {
        let mut config = Self::default();
        let table = match value.as_table() {
            Some(table) => table,
            None => return config,
        };

        if let Some(size) = table.get("indent_size").and_then(coerce_integer) {
            config.indent_size = size;
        }
        if let Some(ch) = table.get("indent_char").and_then(coerce_char) {
            config.indent_char = ch;
        }
        if let Some(level) = table.get("indent_level").and_then(coerce_integer) {
            config.indent_level = level;
        }
        if let Some(preserve) = table.get("preserve_newlines").and_then(Value::as_bool) {
            config.preserve_newlines = preserve;
        }

        config
    }
}

impl<'de> Deserialize<'de> for FormatConfig {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

fn coerce_integer(value: &Value) -> Option<usize> {
    match value {
        Value::Integer(n) => usize::try_from(*n).ok(),
        Value::Float(f) if f.fract() == 0.0 && *f >= 0.0 => Some(*f as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_char(value: &Value) -> Option<char> {
    let text = value.as_str()?;
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

pub fn load_config(path: Option<&Path>) -> Result<FormatConfig> {
    if let Some(path) = path {
        return read_config_file(path);
    }

    let default_path = PathBuf::from("js-fmt.toml");
    if default_path.exists() {
        return read_config_file(&default_path);
    }

    Ok(FormatConfig::default())
}

fn read_config_file(path: &Path) -> Result<FormatConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: FormatConfig =
        toml::from_str(&contents).with_context(|| format!("invalid config file {}", path.display()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_four_space_indent() {
        let config = FormatConfig::default();
        assert_eq!(config.indent_size, 4);
        assert_eq!(config.indent_char, ' ');
        assert_eq!(config.indent_level, 0);
        assert!(!config.preserve_newlines);
    }

    #[test]
    fn falls_back_on_bad_values() {
        let value: Value = toml::from_str(
            "indent_size = \"bad\"\nindent_char = \"xy\"\npreserve_newlines = \"yes\"\n",
        )
        .unwrap();
        let config = FormatConfig::from_value(&value);
        assert_eq!(config.indent_size, 4);
        assert_eq!(config.indent_char, ' ');
        assert!(!config.preserve_newlines);
    }

    #[test]
    fn accepts_numeric_strings() {
        let value: Value = toml::from_str("indent_size = \"2\"\nindent_level = 1\n").unwrap();
        let config = FormatConfig::from_value(&value);
        assert_eq!(config.indent_size, 2);
        assert_eq!(config.indent_level, 1);
    }

    #[test]
    fn accepts_integer_valued_floats() {
        let value: Value = toml::from_str("indent_size = 2.0\nindent_level = 1.5\n").unwrap();
        let config = FormatConfig::from_value(&value);
        assert_eq!(config.indent_size, 2);
        assert_eq!(config.indent_level, 0);
    }

    #[test]
    fn ignores_unknown_keys() {
        let value: Value = toml::from_str("wrap_line_length = 80\nindent_char = \"\\t\"\n").unwrap();
        let config = FormatConfig::from_value(&value);
        assert_eq!(config.indent_char, '\t');
        assert_eq!(config.indent_size, 4);
    }

    #[test]
    fn deserializes_through_serde() {
        let config: FormatConfig = toml::from_str("indent_size = 8\npreserve_newlines = true\n").unwrap();
        assert_eq!(config.indent_size, 8);
        assert!(config.preserve_newlines);
    }
}
