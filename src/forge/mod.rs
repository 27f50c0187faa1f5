//! Station compilation and load-wave coordination.
//!
//! - [`compile`] – Builds and publishes a [`StationTable`](crate::registry::StationTable)
//!   from the current registries.
//! - [`Coordinator`] – Runs registration waves and dispatches compilation to
//!   a bounded [`WorkerPool`].
//! - [`Catalog`] – TOML definitions of compounds and formulas.
//! - [`Translator`] – Display names for station titles.

mod catalog;
mod compile;
mod config;
mod coordinator;
mod error;
mod translate;
mod worker;

pub use catalog::Catalog;
pub use compile::compile;
pub use config::{DEFAULT_NAMESPACE, ForgeConfig};
pub use coordinator::{Batch, Coordinator, WaveHandle, WaveReport};
pub use error::Error;
pub use translate::{TranslationTable, Translator};
pub use worker::{TaskClass, WorkerPool};
