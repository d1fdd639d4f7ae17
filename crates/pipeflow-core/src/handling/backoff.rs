//! Estrategias de espera entre reintentos.
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::FIXED_BACKOFF_SECS;

/// Función pura: índice de intento (base 0) -> espera antes del intento.
pub trait Backoff: Send + Sync {
    fn delay(&self, attempt: u32) -> Duration;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryStrategy {
    /// 2^k segundos.
    #[default]
    Exponential,
    /// (k + 1) segundos.
    Linear,
    /// 2 segundos constantes.
    Fixed,
}

impl Backoff for RetryStrategy {
    fn delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Exponential => Duration::from_secs(2u64.saturating_pow(attempt)),
            Self::Linear => Duration::from_secs(u64::from(attempt) + 1),
            Self::Fixed => Duration::from_secs(FIXED_BACKOFF_SECS),
        }
    }
}

impl fmt::Display for RetryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exponential => "exponential",
            Self::Linear => "linear",
            Self::Fixed => "fixed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown retry strategy '{0}' (expected exponential, linear or fixed)")]
pub struct ParseStrategyError(pub String);

impl FromStr for RetryStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exponential" => Ok(Self::Exponential),
            "linear" => Ok(Self::Linear),
            "fixed" => Ok(Self::Fixed),
            _ => Err(ParseStrategyError(s.to_string())),
        }
    }
}
