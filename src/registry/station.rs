use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwapOption;
use indexmap::IndexMap;
use parking_lot::{Mutex, MutexGuard};

use crate::model::station::ReactionStation;

/// One compiled set of reaction stations, keyed by compound key in compound
/// registration order. Immutable once published.
#[derive(Debug, Clone, Default)]
pub struct StationTable {
    namespace: String,
    stations: IndexMap<String, Arc<ReactionStation>>,
}

impl StationTable {
    pub(crate) fn new(namespace: impl Into<String>, stations: Vec<ReactionStation>) -> Self {
        Self {
            namespace: namespace.into(),
            stations: stations
                .into_iter()
                .map(|s| (s.compound().key().to_string(), Arc::new(s)))
                .collect(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The station exposing `compound_key`.
    pub fn get(&self, compound_key: &str) -> Option<&Arc<ReactionStation>> {
        self.stations.get(compound_key)
    }

    /// The station with the given station id (`"<namespace>_<key>"`).
    pub fn by_id(&self, station_id: &str) -> Option<&Arc<ReactionStation>> {
        let key = station_id
            .strip_prefix(self.namespace.as_str())?
            .strip_prefix('_')?;
        self.get(key).filter(|s| s.id() == station_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ReactionStation>> {
        self.stations.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Total recipes across all stations.
    pub fn recipe_count(&self) -> usize {
        self.stations.values().map(|s| s.recipes().len()).sum()
    }
}

/// Result of looking a station up while loading may still be in progress.
#[derive(Debug, Clone)]
pub enum StationLookup {
    Ready(Arc<ReactionStation>),
    /// No table has been published yet or a load wave is running; the
    /// station may still appear.
    Pending,
    /// The published table is settled and has no station for the compound.
    Absent,
}

impl StationLookup {
    pub fn ready(self) -> Option<Arc<ReactionStation>> {
        match self {
            StationLookup::Ready(station) => Some(station),
            _ => None,
        }
    }
}

/// Published station table shared between the compiler and its readers.
///
/// Readers never block: each read sees one complete table. Compilation
/// publishes a new table with [`Stations::publish`] only after it finished.
///
/// The loading flag doubles as the single-flight marker for load waves, so
/// every coordinator over the same registries shares it. Compile passes are
/// serialized by [`Stations::compile_guard`].
#[derive(Debug, Default)]
pub struct Stations {
    table: ArcSwapOption<StationTable>,
    loading: AtomicBool,
    compile: Mutex<()>,
}

impl Stations {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current table, if any compilation has completed.
    pub fn current(&self) -> Option<Arc<StationTable>> {
        self.table.load_full()
    }

    pub fn lookup(&self, compound_key: &str) -> StationLookup {
        let table = self.table.load();
        match table.as_ref().and_then(|t| t.get(compound_key)) {
            Some(station) => StationLookup::Ready(Arc::clone(station)),
            None if table.is_none() || self.is_loading() => StationLookup::Pending,
            None => StationLookup::Absent,
        }
    }

    /// `true` while a load wave is between registration and publication.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Marks a wave as loading. Returns `false` if one already is.
    pub(crate) fn begin_loading(&self) -> bool {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn finish_loading(&self) {
        self.loading.store(false, Ordering::Release);
    }

    pub(crate) fn compile_guard(&self) -> MutexGuard<'_, ()> {
        self.compile.lock()
    }

    pub(crate) fn publish(&self, table: StationTable) -> Arc<StationTable> {
        let table = Arc::new(table);
        self.table.store(Some(Arc::clone(&table)));
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::compound::Compound;

    fn station(key: &str) -> ReactionStation {
        let compound = Arc::new(Compound::new(key, key, "H2O").unwrap());
        ReactionStation::new("solution", compound, key.to_string())
    }

    #[test]
    fn lookup_is_pending_before_first_publish() {
        let stations = Stations::new();
        assert!(matches!(stations.lookup("H2O"), StationLookup::Pending));
        assert!(stations.current().is_none());
    }

    #[test]
    fn lookup_distinguishes_absent_from_pending() {
        let stations = Stations::new();
        stations.publish(StationTable::new("solution", vec![station("H2O")]));

        assert_eq!(
            stations.lookup("H2O").ready().map(|s| s.id().to_string()),
            Some("solution_H2O".to_string())
        );
        assert!(matches!(stations.lookup("NaCl"), StationLookup::Absent));

        assert!(stations.begin_loading());
        assert!(matches!(stations.lookup("NaCl"), StationLookup::Pending));
        assert!(matches!(stations.lookup("H2O"), StationLookup::Ready(_)));
    }

    #[test]
    fn only_one_wave_may_be_loading() {
        let stations = Stations::new();
        assert!(stations.begin_loading());
        assert!(!stations.begin_loading());
        assert!(stations.is_loading());

        stations.finish_loading();
        assert!(!stations.is_loading());
        assert!(stations.begin_loading());
    }

    #[test]
    fn by_id_strips_namespace() {
        let table = StationTable::new("solution", vec![station("H2O"), station("NaCl")]);
        assert_eq!(table.by_id("solution_NaCl").unwrap().compound().key(), "NaCl");
        assert!(table.by_id("other_NaCl").is_none());
        assert!(table.by_id("solutionNaCl").is_none());
        assert_eq!(table.len(), 2);
        assert_eq!(table.recipe_count(), 0);
    }
}
