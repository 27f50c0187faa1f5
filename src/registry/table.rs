use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};

use super::error::{EntryKind, Error};

/// Callback run once when a load batch completes.
pub type LoadCallback = Box<dyn FnOnce(&LoadSummary) + Send + 'static>;

/// Outcome of finalizing one load batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub kind: EntryKind,
    /// Sequence number of the batch, starting at 1.
    pub batch: u64,
    /// Entries registered during this batch.
    pub registered: usize,
    /// Entries in the registry after this batch.
    pub total: usize,
}

/// An entry addressable by a unique string key.
pub trait Keyed: Send + Sync + 'static {
    const KIND: EntryKind;

    fn key(&self) -> &str;
}

/// Batch bookkeeping. A batch is open until `finish`; registering into a
/// finished batch opens the next one.
struct LoadCycle {
    batch: u64,
    sealed: bool,
    registered: usize,
}

impl LoadCycle {
    fn new() -> Self {
        Self {
            batch: 1,
            sealed: false,
            registered: 0,
        }
    }

    fn open(&mut self) {
        if self.sealed {
            self.batch += 1;
            self.sealed = false;
            self.registered = 0;
        }
    }

    fn finish(&mut self) -> (u64, usize) {
        self.open();
        self.sealed = true;
        (self.batch, self.registered)
    }
}

struct Inner<T> {
    entries: IndexMap<String, Arc<T>>,
    cycle: LoadCycle,
}

/// Keyed, insertion-ordered, append-only table with a load lifecycle.
///
/// Reads take a shared lock; registration takes the write lock for the
/// duration of one insert. Load callbacks are queued under their own mutex,
/// since they are `Send` but not `Sync`, and run after every lock is
/// released so they may read from or register into any registry.
pub struct Registry<T: Keyed> {
    inner: RwLock<Inner<T>>,
    callbacks: Mutex<Vec<LoadCallback>>,
}

impl<T: Keyed> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Keyed> Registry<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                entries: IndexMap::new(),
                cycle: LoadCycle::new(),
            }),
            callbacks: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn insert(&self, entry: T) -> Result<Arc<T>, Error> {
        validate_key(T::KIND, entry.key())?;

        let mut inner = self.inner.write();
        if inner.entries.contains_key(entry.key()) {
            return Err(Error::duplicate(T::KIND, entry.key()));
        }

        inner.cycle.open();
        inner.cycle.registered += 1;

        let entry = Arc::new(entry);
        inner
            .entries
            .insert(entry.key().to_string(), Arc::clone(&entry));
        Ok(entry)
    }

    pub fn get(&self, key: &str) -> Result<Arc<T>, Error> {
        self.inner
            .read()
            .entries
            .get(key)
            .cloned()
            .ok_or_else(|| Error::not_found(T::KIND, key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.read().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// All entries in registration order.
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.inner.read().entries.values().cloned().collect()
    }

    /// Queues `callback` to run once when the current batch is loaded.
    /// Callbacks run in the order they were queued.
    pub fn on_load_complete<F>(&self, callback: F)
    where
        F: FnOnce(&LoadSummary) + Send + 'static,
    {
        self.callbacks.lock().push(Box::new(callback));
    }

    /// Finalizes the current batch and runs its queued callbacks.
    pub fn load(&self) -> LoadSummary {
        let (summary, callbacks) = {
            let mut inner = self.inner.write();
            let (batch, registered) = inner.cycle.finish();
            let callbacks = std::mem::take(&mut *self.callbacks.lock());
            let summary = LoadSummary {
                kind: T::KIND,
                batch,
                registered,
                total: inner.entries.len(),
            };
            (summary, callbacks)
        };

        tracing::debug!(
            kind = %summary.kind,
            batch = summary.batch,
            registered = summary.registered,
            total = summary.total,
            callbacks = callbacks.len(),
            "load batch complete"
        );

        for callback in callbacks {
            callback(&summary);
        }
        summary
    }

    /// `true` once the current batch has been loaded and nothing has been
    /// registered since.
    pub fn is_loaded(&self) -> bool {
        self.inner.read().cycle.sealed
    }

    pub fn batch(&self) -> u64 {
        self.inner.read().cycle.batch
    }
}

fn validate_key(kind: EntryKind, key: &str) -> Result<(), Error> {
    if key.is_empty() {
        return Err(Error::invalid(kind, key, "key is empty"));
    }
    if let Some(ch) = key
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-')))
    {
        return Err(Error::invalid(
            kind,
            key,
            format!("key contains '{}'; use ASCII letters, digits, '_' or '-'", ch),
        ));
    }
    Ok(())
}
