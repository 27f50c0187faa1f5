//! Error types for catalog loading and station compilation.
//!
//! Per-entry registration failures are not errors at this level: they are
//! collected into the wave report. Everything here aborts the operation it
//! is returned from.

use thiserror::Error;

use crate::registry;

/// Errors that can occur while loading catalogs or compiling stations.
#[derive(Debug, Error)]
pub enum Error {
    /// A formula output has no station in the staging table.
    ///
    /// The compiler creates one station per registered compound before
    /// attaching recipes, so this only occurs when the compound registry
    /// and the formula registry disagree.
    #[error("formula '{formula}' produces '{compound}' but no station exists for it")]
    MissingStation {
        /// The formula whose recipe could not be attached.
        formula: String,
        /// The output compound key.
        compound: String,
    },

    /// Two stations were synthesized for the same compound key.
    #[error("station for compound '{key}' was synthesized twice")]
    StationCollision {
        /// The compound key.
        key: String,
    },

    /// A load wave was submitted while another one is still running.
    #[error("a load wave is already in flight")]
    WaveInFlight,

    /// The compilation task panicked or was cancelled by the worker pool.
    #[error("compilation worker failed: {0}")]
    Worker(String),

    /// The worker pool could not be started.
    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[source] std::io::Error),

    /// Failed to parse a catalog TOML.
    #[error("failed to parse catalog: {0}")]
    CatalogParse(#[source] toml::de::Error),

    /// Failed to parse a translation table TOML.
    #[error("failed to parse translation table: {0}")]
    TranslationParse(#[source] toml::de::Error),

    /// A registry operation failed outside of a wave.
    #[error(transparent)]
    Registry(#[from] registry::Error),
}

impl Error {
    /// Creates a [`MissingStation`](Error::MissingStation) error.
    pub fn missing_station(formula: &str, compound: &str) -> Self {
        Self::MissingStation {
            formula: formula.to_string(),
            compound: compound.to_string(),
        }
    }

    /// Creates a [`StationCollision`](Error::StationCollision) error.
    pub fn station_collision(key: impl Into<String>) -> Self {
        Self::StationCollision { key: key.into() }
    }

    /// `true` for the errors that abort a compilation pass.
    pub fn is_compilation_failure(&self) -> bool {
        matches!(
            self,
            Self::MissingStation { .. } | Self::StationCollision { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_station_names_formula_and_compound() {
        let err = Error::missing_station("brine", "Brine");
        assert_eq!(
            err.to_string(),
            "formula 'brine' produces 'Brine' but no station exists for it"
        );
        assert!(err.is_compilation_failure());
        assert!(!Error::WaveInFlight.is_compilation_failure());
    }

    #[test]
    fn registry_errors_are_transparent() {
        let err: Error = registry::Error::unresolved("transmute", "Unobtainium").into();
        assert_eq!(
            err.to_string(),
            "formula 'transmute' references unregistered compound 'Unobtainium'"
        );
    }
}
