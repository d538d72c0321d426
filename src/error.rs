//! Start-time errors.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::fault::CritCode;

/// Subsystem start failed. Fatal for the caller.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot spawn task {name}: {source}")]
    TaskSpawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("input task already attached")]
    InputAttached,
}

impl StartError {
    /// Critical error code to escalate with.
    pub fn crit_code(&self) -> CritCode {
        match self {
            Self::Config(_) | Self::InputAttached => CritCode::ConfigError,
            Self::TaskSpawn { .. } => CritCode::MallocError,
        }
    }

    /// Extra detail for the fault record.
    pub fn detail(&self) -> u32 {
        match self {
            Self::TaskSpawn { source, .. } => source.raw_os_error().unwrap_or(0) as u32,
            _ => 0,
        }
    }
}
