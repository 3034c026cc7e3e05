//! Centralized error type for the itd umbrella crate.
//!
//! Wraps the subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] itd_core::Error),

    #[error("Sampler: {0}")]
    Sampler(#[from] itd_sampler::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The core error behind this one, if any (including sampler-wrapped ones).
    pub fn as_core(&self) -> Option<&itd_core::Error> {
        match self {
            Self::Core(e) | Self::Sampler(itd_sampler::Error::Core(e)) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
