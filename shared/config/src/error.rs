use std::num::ParseIntError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown config option {0:?}")]
    UnknownOption(String),

    #[error("--{option} expects comma-separated integers, but {segment:?} is not one")]
    InvalidIntList {
        option: &'static str,
        segment: String,
        #[source]
        source: ParseIntError,
    },

    #[error("invalid value for --{option}: {reason}")]
    InvalidValue {
        option: &'static str,
        reason: String,
    },

    #[error("failed to parse command line: {0}")]
    Parse(#[from] clap::Error),

    #[error("failed to collect option values: {0}")]
    Collect(#[from] serde_json::Error),
}
