//! A chemical state and reaction subsystem: compounds held in physical
//! containers, declarative reaction formulas, and the reaction stations
//! compiled from them.
//!
//! # Features
//!
//! - **Container model** — A container expresses its contents either as an
//!   absolute mass or as a bounded percentage, selected by phase; invariant
//!   violations are rejected, never clamped
//! - **Registries** — Append-only compound and formula registries with a
//!   load lifecycle and referential integrity checks
//! - **Station compilation** — One station per compound, every formula attached
//!   as a recipe to the station of each output, published atomically
//! - **Load waves** — Registration on the caller, compilation on a bounded
//!   worker pool, strictly after all formulas of the wave are registered
//!
//! # Quick Start
//!
//! ```
//! use reagent_forge::{Batch, Coordinator, ForgeConfig, Formula, Reagent, Registries};
//!
//! let coordinator = Coordinator::new(Registries::new(), &ForgeConfig::default())?;
//!
//! let batch = Batch::new()
//!     .compound("H2O", "Water", "H2O")
//!     .compound("NaCl", "Sodium Chloride", "NaCl")
//!     .compound("Brine", "Brine", "H2ONaCl")
//!     .formula(Formula::new(
//!         "brine",
//!         vec![Reagent::new("H2O", 1.0), Reagent::new("NaCl", 1.0)],
//!         vec![Reagent::new("Brine", 1.0)],
//!     ));
//!
//! let report = coordinator.submit(batch)?.wait()?;
//!
//! assert_eq!(report.stations(), 3);
//! let brine = report.table.get("Brine").unwrap();
//! assert_eq!(brine.id(), "solution_Brine");
//! assert_eq!(brine.recipes().len(), 1);
//! assert!(report.table.get("H2O").unwrap().recipes().is_empty());
//! # Ok::<(), reagent_forge::ForgeError>(())
//! ```
//!
//! # Module Organization
//!
//! - [`model`] — Elements, compositions, compounds, formulas, containers, stations
//! - [`registry`] — Compound, formula and station registries
//! - [`io`] — Catalog reading and station table output (TOML, JSON)
//! - [`Coordinator`] — Load waves and background compilation
//! - [`ForgeConfig`] — Namespace, worker pool size, custom catalog and names

mod forge;

pub mod io;
pub mod model;
pub mod registry;

pub use model::composition::{Composition, ParseCompositionError};
pub use model::compound::{Compound, CompoundDef};
pub use model::container::{
    ContainerError, ContainerState, ContainerType, ContainmentMode, MassContainer,
    PercentageContainer, PhysicalState, SealStatus,
};
pub use model::formula::{Balance, Formula, Reagent};
pub use model::station::{ReactionError, ReactionStation, Recipe, StationDisplay};
pub use model::types::{Element, ParseElementError};

pub use registry::{
    CompoundRegistry, EntryKind, FormulaRegistry, LoadSummary, Registries, StationLookup,
    StationTable, Stations,
};

pub use forge::{
    Batch, Catalog, Coordinator, DEFAULT_NAMESPACE, ForgeConfig, TaskClass, TranslationTable,
    Translator, WaveHandle, WaveReport, WorkerPool, compile,
};

pub use forge::Error as ForgeError;
pub use registry::Error as RegistryError;
