use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::error::Error;
use crate::model::compound::CompoundDef;
use crate::model::formula::Formula;

const DEFAULT_CATALOG_TOML: &str = include_str!("../../resources/default.catalog.toml");

static DEFAULT_CATALOG: OnceLock<Catalog> = OnceLock::new();

/// Compound and formula definitions for one load wave.
///
/// In TOML, compounds are `[[compound]]` tables and formulas `[[formula]]`
/// tables; both keep their declared order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default, rename = "compound")]
    pub compounds: Vec<CompoundDef>,
    #[serde(default, rename = "formula")]
    pub formulas: Vec<Formula>,
}

impl Catalog {
    pub fn from_toml(content: &str) -> Result<Self, Error> {
        toml::from_str(content).map_err(Error::CatalogParse)
    }

    /// The catalog shipped with the crate.
    pub fn embedded() -> &'static Catalog {
        DEFAULT_CATALOG.get_or_init(|| {
            toml::from_str(DEFAULT_CATALOG_TOML)
                .expect("Failed to parse embedded default catalog. This is a library bug.")
        })
    }

    /// Parses `custom` if given, otherwise returns a copy of the embedded catalog.
    pub fn load(custom: Option<&str>) -> Result<Self, Error> {
        match custom {
            Some(content) => Self::from_toml(content),
            None => Ok(Self::embedded().clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.compounds.is_empty() && self.formulas.is_empty()
    }
}
