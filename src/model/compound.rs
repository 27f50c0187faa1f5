use std::fmt;

use serde::{Deserialize, Serialize};

use super::composition::{Composition, ParseCompositionError, subscript_label};

/// A registered chemical substance.
///
/// The `key` is the stable identifier used by formulas, containers and
/// stations; `name` is the untranslated display name and `formula` the
/// descriptor the [`Composition`] is parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    key: String,
    name: String,
    formula: String,
    composition: Composition,
}

/// Serialized form of a compound as it appears in catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundDef {
    pub key: String,
    pub name: String,
    pub formula: String,
}

impl Compound {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        formula: impl Into<String>,
    ) -> Result<Self, ParseCompositionError> {
        let formula = formula.into();
        let composition = Composition::parse(&formula)?;
        Ok(Self {
            key: key.into(),
            name: name.into(),
            formula,
            composition,
        })
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn formula(&self) -> &str {
        &self.formula
    }

    #[inline]
    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn molar_mass(&self) -> f64 {
        self.composition.molar_mass()
    }

    /// The formula descriptor with subscripted counts, e.g. `H₂O`.
    pub fn label(&self) -> String {
        subscript_label(&self.formula)
    }

    pub fn to_def(&self) -> CompoundDef {
        CompoundDef {
            key: self.key.clone(),
            name: self.name.clone(),
            formula: self.formula.clone(),
        }
    }
}

impl TryFrom<CompoundDef> for Compound {
    type Error = ParseCompositionError;

    fn try_from(def: CompoundDef) -> Result<Self, Self::Error> {
        Compound::new(def.key, def.name, def.formula)
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.label())
    }
}
