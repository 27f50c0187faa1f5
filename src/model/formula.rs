use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::compound::Compound;
use super::types::Element;

const BALANCE_TOLERANCE: f64 = 1e-9;

/// One side entry of a formula: a compound key and the quantity consumed or
/// produced per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reagent {
    pub compound: String,
    pub quantity: f64,
}

impl Reagent {
    pub fn new(compound: impl Into<String>, quantity: f64) -> Self {
        Self {
            compound: compound.into(),
            quantity,
        }
    }
}

/// A declarative reaction rule. Inputs and outputs keep their declared order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formula {
    pub id: String,
    pub inputs: Vec<Reagent>,
    pub outputs: Vec<Reagent>,
}

impl Formula {
    pub fn new(id: impl Into<String>, inputs: Vec<Reagent>, outputs: Vec<Reagent>) -> Self {
        Self {
            id: id.into(),
            inputs,
            outputs,
        }
    }

    /// Every compound key the formula names, inputs first, in declared order.
    pub fn referenced_keys(&self) -> impl Iterator<Item = &str> {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .map(|r| r.compound.as_str())
    }

    pub fn produces(&self, compound: &str) -> bool {
        self.outputs.iter().any(|r| r.compound == compound)
    }

    /// Element delta (products minus reactants) weighted by reagent
    /// quantities. `None` if `lookup` cannot resolve a named compound.
    pub fn element_balance<F>(&self, lookup: F) -> Option<Balance>
    where
        F: Fn(&str) -> Option<Arc<Compound>>,
    {
        let mut delta: BTreeMap<Element, f64> = BTreeMap::new();

        for (side, sign) in [(&self.inputs, -1.0), (&self.outputs, 1.0)] {
            for reagent in side {
                let compound = lookup(&reagent.compound)?;
                for (element, count) in compound.composition().iter() {
                    *delta.entry(element).or_insert(0.0) +=
                        sign * reagent.quantity * f64::from(count);
                }
            }
        }

        delta.retain(|_, v| v.abs() > BALANCE_TOLERANCE);
        Some(Balance { delta })
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn side(f: &mut fmt::Formatter<'_>, reagents: &[Reagent]) -> fmt::Result {
            for (i, r) in reagents.iter().enumerate() {
                if i > 0 {
                    f.write_str(" + ")?;
                }
                write!(f, "{} {}", r.quantity, r.compound)?;
            }
            Ok(())
        }

        side(f, &self.inputs)?;
        f.write_str(" → ")?;
        side(f, &self.outputs)
    }
}

/// Elements created (positive) or destroyed (negative) by one formula run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Balance {
    delta: BTreeMap<Element, f64>,
}

impl Balance {
    #[inline]
    pub fn is_balanced(&self) -> bool {
        self.delta.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Element, f64)> + '_ {
        self.delta.iter().map(|(e, d)| (*e, *d))
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_balanced() {
            return f.write_str("balanced");
        }
        for (i, (element, d)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}{:+}", element, d)?;
        }
        Ok(())
    }
}
