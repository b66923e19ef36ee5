use std::str::FromStr;

use thiserror::Error;

use crate::parser::OperandParsing;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Failed to parse env var {key} with value {value}: {message}")]
pub struct ConfigError {
    pub key: String,
    pub value: String,
    pub message: String,
}

/// Run settings read from `STACKLANG_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    pub max_stack_size: Option<usize>,
    pub op_limit: Option<u64>,
    pub operand_parsing: OperandParsing,
    pub echo: bool,
}

impl RunConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let strict: bool = parse_env(&lookup, "STACKLANG_STRICT_OPERANDS")?.unwrap_or(false);
        Ok(RunConfig {
            max_stack_size: parse_env(&lookup, "STACKLANG_MAX_STACK_SIZE")?,
            op_limit: parse_env(&lookup, "STACKLANG_OP_LIMIT")?,
            operand_parsing: if strict { OperandParsing::Strict } else { OperandParsing::Permissive },
            echo: parse_env(&lookup, "STACKLANG_ECHO")?.unwrap_or(false),
        })
    }
}

fn parse_env<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr + 'static, <T as FromStr>::Err: std::fmt::Display
{
    let Some(mut val) = lookup(key) else {
        return Ok(None);
    };
    if val.is_empty() {
        return Ok(None);
    }
    if std::any::TypeId::of::<T>() == std::any::TypeId::of::<bool>() {
        val = val.to_lowercase();
        if val == "1" || val == "yes" {
            val = "true".to_string();
        } else if val == "0" || val == "no" {
            val = "false".to_string();
        }
    }
    val.parse::<T>().map(Some).map_err(|err| ConfigError {
        key: key.to_string(),
        value: val.clone(),
        message: err.to_string(),
    })
}
