use std::collections::HashMap;

use serde::Deserialize;

use super::error::Error;
use crate::model::compound::Compound;

/// Resolves the display name of a compound for station titles.
pub trait Translator: Send + Sync {
    fn translate(&self, compound: &Compound) -> String;
}

/// Name table keyed by compound key, read from a TOML `[names]` table.
/// Compounds without an entry keep their registered name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TranslationTable {
    #[serde(default)]
    names: HashMap<String, String>,
}

impl TranslationTable {
    pub fn from_toml(content: &str) -> Result<Self, Error> {
        toml::from_str(content).map_err(Error::TranslationParse)
    }

    pub fn load(custom: Option<&str>) -> Result<Self, Error> {
        custom.map_or_else(|| Ok(Self::default()), Self::from_toml)
    }

    pub fn insert(&mut self, key: impl Into<String>, name: impl Into<String>) {
        self.names.insert(key.into(), name.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Translator for TranslationTable {
    fn translate(&self, compound: &Compound) -> String {
        self.names
            .get(compound.key())
            .cloned()
            .unwrap_or_else(|| compound.name().to_string())
    }
}
