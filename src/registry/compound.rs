use std::sync::Arc;

use super::error::{EntryKind, Error};
use super::table::{Keyed, Registry};
use crate::model::compound::{Compound, CompoundDef};

impl Keyed for Compound {
    const KIND: EntryKind = EntryKind::Compound;

    fn key(&self) -> &str {
        Compound::key(self)
    }
}

/// Registry of every known compound, keyed by compound key.
pub type CompoundRegistry = Registry<Compound>;

impl Registry<Compound> {
    pub fn register(&self, compound: Compound) -> Result<Arc<Compound>, Error> {
        let registered = self.insert(compound)?;
        tracing::debug!(
            key = registered.key(),
            formula = registered.formula(),
            "registered compound"
        );
        Ok(registered)
    }

    /// Parses the composition of `def` and registers the result.
    pub fn register_def(&self, def: CompoundDef) -> Result<Arc<Compound>, Error> {
        let key = def.key.clone();
        let compound = Compound::try_from(def)
            .map_err(|e| Error::invalid(EntryKind::Compound, key, e.to_string()))?;
        self.register(compound)
    }
}
