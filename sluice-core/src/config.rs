use crate::{Provider, QueryError, Result, Value};
use std::{env, time::Duration};

/// Which strings become null after trimming.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zap {
    #[default]
    Keep,
    /// Blank or whitespace only strings.
    Whitespace,
    /// Strictly empty strings.
    Empty,
}

/// Post-processing of string results: trim first, then zap.
///
/// A `Char` value is handled as a string of one character.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringPolicy {
    pub trim: bool,
    pub zap: Zap,
}

impl StringPolicy {
    pub fn new(trim: bool, zap: Zap) -> Self {
        Self { trim, zap }
    }

    pub fn is_noop(&self) -> bool {
        !self.trim && self.zap == Zap::Keep
    }

    pub fn apply(&self, value: Value) -> Value {
        match value {
            Value::Varchar(Some(v)) => {
                let v = if self.trim { v.trim().to_string() } else { v };
                let zap = match self.zap {
                    Zap::Keep => false,
                    Zap::Whitespace => v.trim().is_empty(),
                    Zap::Empty => v.is_empty(),
                };
                Value::Varchar(if zap { None } else { Some(v) })
            }
            // A whitespace character trims down to the empty string.
            Value::Char(Some(v)) if v.is_whitespace() => {
                let zap = match self.zap {
                    Zap::Keep => false,
                    Zap::Whitespace => true,
                    Zap::Empty => self.trim,
                };
                Value::Char(if zap { None } else { Some(v) })
            }
            v => v,
        }
    }
}

/// Settings threaded explicitly through rendering and execution.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Config {
    /// Dialect used when neither the call nor the filter names one.
    pub provider: Option<Provider>,
    pub command_timeout: Option<Duration>,
    pub strings: StringPolicy,
}

impl Config {
    pub const PROVIDER: &'static str = "SLUICE_PROVIDER";
    pub const COMMAND_TIMEOUT: &'static str = "SLUICE_COMMAND_TIMEOUT";
    pub const TRIM_STRINGS: &'static str = "SLUICE_TRIM_STRINGS";
    pub const ZAP_STRINGS: &'static str = "SLUICE_ZAP_STRINGS";

    /// Reads the `SLUICE_*` environment variables, missing ones keep the default.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();
        if let Some(v) = lookup(Self::PROVIDER) {
            config.provider = Some(v.parse()?);
        }
        if let Some(v) = lookup(Self::COMMAND_TIMEOUT) {
            let seconds = v.trim().parse::<u64>().map_err(|e| {
                QueryError::validation(format!(
                    "{} must be a number of seconds, found `{}`: {}",
                    Self::COMMAND_TIMEOUT,
                    v,
                    e
                ))
            })?;
            config.command_timeout = Some(Duration::from_secs(seconds));
        }
        if let Some(v) = lookup(Self::TRIM_STRINGS) {
            config.strings.trim = parse_flag(Self::TRIM_STRINGS, &v)?;
        }
        if let Some(v) = lookup(Self::ZAP_STRINGS) {
            config.strings.zap = match v.trim().to_ascii_lowercase().as_str() {
                "keep" | "" => Zap::Keep,
                "whitespace" => Zap::Whitespace,
                "empty" => Zap::Empty,
                _ => {
                    return Err(QueryError::validation(format!(
                        "{} must be one of keep, whitespace, empty, found `{}`",
                        Self::ZAP_STRINGS,
                        v
                    )));
                }
            };
        }
        log::trace!("Loaded {:?}", config);
        Ok(config)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(QueryError::validation(format!(
            "{} must be a boolean, found `{}`",
            key, value
        ))),
    }
}
