//! Compound, formula and station registries.
//!
//! Registries are plain owned objects shared through [`Registries`]; nothing
//! here is global. Compounds and formulas are append-only tables with a
//! load lifecycle (see [`Registry::load`]); stations are published as whole
//! [`StationTable`] snapshots by the compiler in [`crate::forge`].

mod compound;
mod error;
mod formula;
mod station;
mod table;

use std::sync::Arc;

pub use compound::CompoundRegistry;
pub use error::{EntryKind, Error};
pub use formula::FormulaRegistry;
pub use station::{StationLookup, StationTable, Stations};
pub use table::{Keyed, LoadCallback, LoadSummary, Registry};

/// The registries one subsystem instance works on.
#[derive(Clone)]
pub struct Registries {
    pub compounds: Arc<CompoundRegistry>,
    pub formulas: Arc<FormulaRegistry>,
    pub stations: Arc<Stations>,
}

impl Registries {
    pub fn new() -> Self {
        let compounds = Arc::new(CompoundRegistry::new());
        let formulas = Arc::new(FormulaRegistry::new(Arc::clone(&compounds)));
        Self {
            compounds,
            formulas,
            stations: Arc::new(Stations::new()),
        }
    }
}

impl Default for Registries {
    fn default() -> Self {
        Self::new()
    }
}
