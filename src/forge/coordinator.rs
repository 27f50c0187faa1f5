use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::catalog::Catalog;
use super::compile::compile;
use super::config::ForgeConfig;
use super::error::Error;
use super::translate::{TranslationTable, Translator};
use super::worker::{TaskClass, WorkerPool};
use crate::model::compound::CompoundDef;
use crate::model::formula::Formula;
use crate::registry::{self, Registries, StationTable, Stations};

/// Definitions submitted together as one load wave.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub compounds: Vec<CompoundDef>,
    pub formulas: Vec<Formula>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compound(
        mut self,
        key: impl Into<String>,
        name: impl Into<String>,
        formula: impl Into<String>,
    ) -> Self {
        self.compounds.push(CompoundDef {
            key: key.into(),
            name: name.into(),
            formula: formula.into(),
        });
        self
    }

    pub fn formula(mut self, formula: Formula) -> Self {
        self.formulas.push(formula);
        self
    }
}

impl From<Catalog> for Batch {
    fn from(catalog: Catalog) -> Self {
        Self {
            compounds: catalog.compounds,
            formulas: catalog.formulas,
        }
    }
}

/// Outcome of a completed load wave.
#[derive(Debug, Clone)]
pub struct WaveReport {
    /// Compound registry batch number of this wave.
    pub batch: u64,
    pub compounds_registered: usize,
    pub formulas_registered: usize,
    /// Per-entry compound rejections, in submission order.
    pub rejected_compounds: Vec<registry::Error>,
    /// Per-entry formula rejections, in submission order.
    pub rejected_formulas: Vec<registry::Error>,
    /// The table published by this wave.
    pub table: Arc<StationTable>,
}

impl WaveReport {
    pub fn stations(&self) -> usize {
        self.table.len()
    }

    pub fn recipes(&self) -> usize {
        self.table.recipe_count()
    }

    /// `true` if every submitted entry was registered.
    pub fn is_clean(&self) -> bool {
        self.rejected_compounds.is_empty() && self.rejected_formulas.is_empty()
    }
}

/// Pending result of a submitted wave.
#[derive(Debug)]
pub struct WaveHandle {
    batch: u64,
    rx: oneshot::Receiver<Result<WaveReport, Error>>,
}

impl WaveHandle {
    pub fn batch(&self) -> u64 {
        self.batch
    }

    /// Blocks until compilation finished. Inside an async runtime this
    /// returns [`Error::Worker`] instead of blocking; use
    /// [`WaveHandle::join`] there.
    pub fn wait(self) -> Result<WaveReport, Error> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(Error::Worker(
                "cannot block on a wave inside an async runtime; use join".to_string(),
            ));
        }
        self.rx.blocking_recv().unwrap_or_else(|_| Err(dropped()))
    }

    pub async fn join(self) -> Result<WaveReport, Error> {
        self.rx.await.unwrap_or_else(|_| Err(dropped()))
    }
}

fn dropped() -> Error {
    Error::Worker("compilation task ended without a result".to_string())
}

fn panicked(payload: Box<dyn Any + Send>) -> Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    Error::Worker(format!("station compilation panicked: {message}"))
}

#[derive(Default)]
struct WaveState {
    batch: u64,
    compounds_registered: usize,
    formulas_registered: usize,
    rejected_compounds: Vec<registry::Error>,
    rejected_formulas: Vec<registry::Error>,
}

/// Clears the shared loading marker when the wave ends, including by panic.
struct InFlight {
    stations: Arc<Stations>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.stations.finish_loading();
    }
}

/// Runs load waves over a set of registries.
///
/// A wave registers compounds, loads the compound registry, registers
/// formulas from the compound load callback, loads the formula registry, and
/// compiles stations on the worker pool from the formula load callback. The
/// compile step therefore always sees every formula of its wave.
///
/// At most one wave runs over a set of registries, however many
/// coordinators share them.
pub struct Coordinator {
    registries: Registries,
    namespace: String,
    translator: Arc<dyn Translator>,
    pool: Arc<WorkerPool>,
    catalog: Option<String>,
}

impl Coordinator {
    pub fn new(registries: Registries, config: &ForgeConfig) -> Result<Self, Error> {
        let translator = TranslationTable::load(config.translations.as_deref())?;
        Self::with_translator(registries, config, Arc::new(translator))
    }

    pub fn with_translator(
        registries: Registries,
        config: &ForgeConfig,
        translator: Arc<dyn Translator>,
    ) -> Result<Self, Error> {
        let pool = WorkerPool::new(config.effective_workers())?;
        Ok(Self {
            registries,
            namespace: config.namespace.clone(),
            translator,
            pool: Arc::new(pool),
            catalog: config.catalog.clone(),
        })
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `true` while any wave over these registries is running.
    pub fn is_in_flight(&self) -> bool {
        self.registries.stations.is_loading()
    }

    /// Submits the configured catalog (or the embedded default) as a wave.
    pub fn submit_catalog(&self) -> Result<WaveHandle, Error> {
        let catalog = Catalog::load(self.catalog.as_deref())?;
        self.submit(catalog.into())
    }

    /// Starts a wave. Registration happens on the calling thread; the
    /// returned handle resolves once the station table is published.
    pub fn submit(&self, batch: Batch) -> Result<WaveHandle, Error> {
        if !self.registries.stations.begin_loading() {
            return Err(Error::WaveInFlight);
        }
        let guard = InFlight {
            stations: Arc::clone(&self.registries.stations),
        };

        let Batch {
            compounds,
            formulas,
        } = batch;
        tracing::info!(
            compounds = compounds.len(),
            formulas = formulas.len(),
            "starting load wave"
        );

        let state = Arc::new(Mutex::new(WaveState::default()));
        let (tx, rx) = oneshot::channel();

        for def in compounds {
            let key = def.key.clone();
            match self.registries.compounds.register_def(def) {
                Ok(_) => state.lock().compounds_registered += 1,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "rejected compound");
                    state.lock().rejected_compounds.push(e);
                }
            }
        }

        self.queue_compile(Arc::clone(&state), tx, guard);
        self.queue_formula_setup(Arc::clone(&state), formulas);

        let summary = self.registries.compounds.load();
        Ok(WaveHandle {
            batch: summary.batch,
            rx,
        })
    }

    fn queue_formula_setup(&self, state: Arc<Mutex<WaveState>>, formulas: Vec<Formula>) {
        let registry = Arc::clone(&self.registries.formulas);
        self.registries.compounds.on_load_complete(move |summary| {
            state.lock().batch = summary.batch;
            for formula in formulas {
                let id = formula.id.clone();
                match registry.register(formula) {
                    Ok(_) => state.lock().formulas_registered += 1,
                    Err(e) => {
                        tracing::warn!(formula = %id, error = %e, "rejected formula");
                        state.lock().rejected_formulas.push(e);
                    }
                }
            }
            registry.load();
        });
    }

    fn queue_compile(
        &self,
        state: Arc<Mutex<WaveState>>,
        tx: oneshot::Sender<Result<WaveReport, Error>>,
        guard: InFlight,
    ) {
        let pool = Arc::clone(&self.pool);
        let registries = self.registries.clone();
        let namespace = self.namespace.clone();
        let translator = Arc::clone(&self.translator);

        self.registries.formulas.on_load_complete(move |_| {
            pool.spawn_blocking(TaskClass::Compile, move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    compile(&registries, &namespace, translator.as_ref())
                }))
                .unwrap_or_else(|payload| {
                    let e = panicked(payload);
                    tracing::error!(namespace = %namespace, error = %e, "station compilation failed");
                    Err(e)
                });
                let state = std::mem::take(&mut *state.lock());
                drop(guard);

                let report = result.map(|table| WaveReport {
                    batch: state.batch,
                    compounds_registered: state.compounds_registered,
                    formulas_registered: state.formulas_registered,
                    rejected_compounds: state.rejected_compounds,
                    rejected_formulas: state.rejected_formulas,
                    table,
                });
                if let Ok(report) = &report {
                    tracing::info!(
                        batch = report.batch,
                        stations = report.stations(),
                        recipes = report.recipes(),
                        rejected = report.rejected_compounds.len() + report.rejected_formulas.len(),
                        "load wave complete"
                    );
                }
                let _ = tx.send(report);
            });
        });
    }

    /// Recompiles the station table from the current registry contents on
    /// the calling thread. Serialized with wave compilations.
    pub fn recompile(&self) -> Result<Arc<StationTable>, Error> {
        compile(&self.registries, &self.namespace, self.translator.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::formula::Reagent;
    use crate::registry::StationLookup;

    fn brine_batch() -> Batch {
        Batch::new()
            .compound("H2O", "Water", "H2O")
            .compound("NaCl", "Salt", "NaCl")
            .compound("Brine", "Brine", "H2ONaCl")
            .formula(Formula::new(
                "brine",
                vec![Reagent::new("H2O", 1.0), Reagent::new("NaCl", 1.0)],
                vec![Reagent::new("Brine", 1.0)],
            ))
    }

    fn coordinator() -> Coordinator {
        Coordinator::new(Registries::new(), &ForgeConfig::default()).unwrap()
    }

    #[test]
    fn wave_compiles_brine_scenario() {
        let coordinator = coordinator();
        let report = coordinator.submit(brine_batch()).unwrap().wait().unwrap();

        assert!(report.is_clean());
        assert_eq!(report.stations(), 3);
        assert_eq!(report.recipes(), 1);
        assert_eq!(report.table.get("Brine").unwrap().recipes().len(), 1);
        assert!(!coordinator.is_in_flight());

        let stations = &coordinator.registries().stations;
        assert!(matches!(stations.lookup("H2O"), StationLookup::Ready(_)));
        assert!(matches!(stations.lookup("Gold"), StationLookup::Absent));
    }

    #[test]
    fn rejections_are_reported_without_aborting() {
        let coordinator = coordinator();
        let batch = brine_batch()
            .compound("H2O", "Water again", "H2O")
            .formula(Formula::new(
                "transmute",
                vec![Reagent::new("H2O", 1.0)],
                vec![Reagent::new("Unobtainium", 1.0)],
            ));

        let report = coordinator.submit(batch).unwrap().wait().unwrap();

        assert_eq!(report.compounds_registered, 3);
        assert_eq!(report.formulas_registered, 1);
        assert_eq!(
            report.rejected_formulas,
            vec![registry::Error::unresolved("transmute", "Unobtainium")]
        );
        assert_eq!(report.rejected_compounds.len(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn later_waves_extend_the_table() {
        let coordinator = coordinator();
        let first = coordinator.submit(brine_batch()).unwrap().wait().unwrap();
        assert_eq!(first.batch, 1);

        let second = coordinator
            .submit(Batch::new().compound("O2", "Oxygen", "O2"))
            .unwrap()
            .wait()
            .unwrap();

        assert_eq!(second.batch, 2);
        assert_eq!(second.stations(), 4);
        assert_eq!(first.stations(), 3);
    }

    #[test]
    fn recompile_uses_current_registries() {
        let coordinator = coordinator();
        coordinator.submit(brine_batch()).unwrap().wait().unwrap();
        let table = coordinator.recompile().unwrap();
        assert_eq!(table.len(), 3);
    }

    #[tokio::test]
    async fn join_resolves_inside_async_context() {
        let coordinator = coordinator();
        let report = coordinator.submit(brine_batch()).unwrap().join().await.unwrap();
        assert_eq!(report.stations(), 3);
    }

    #[tokio::test]
    async fn wait_refuses_to_block_inside_async_context() {
        let coordinator = coordinator();
        let handle = coordinator.submit(brine_batch()).unwrap();
        assert!(matches!(handle.wait(), Err(Error::Worker(_))));
    }
}
