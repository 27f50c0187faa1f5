use std::sync::Arc;

use super::compound::CompoundRegistry;
use super::error::{EntryKind, Error};
use super::table::{Keyed, LoadSummary, Registry};
use crate::model::formula::{Formula, Reagent};

impl Keyed for Formula {
    const KIND: EntryKind = EntryKind::Formula;

    fn key(&self) -> &str {
        &self.id
    }
}

/// Registry of reaction formulas.
///
/// Registration resolves every compound a formula names against the
/// compound registry it was built with; a formula naming an unknown compound
/// is rejected as a whole.
pub struct FormulaRegistry {
    compounds: Arc<CompoundRegistry>,
    formulas: Registry<Formula>,
}

impl FormulaRegistry {
    pub fn new(compounds: Arc<CompoundRegistry>) -> Self {
        Self {
            compounds,
            formulas: Registry::new(),
        }
    }

    pub fn compounds(&self) -> &Arc<CompoundRegistry> {
        &self.compounds
    }

    pub fn register(&self, formula: Formula) -> Result<Arc<Formula>, Error> {
        validate_sides(&formula)?;

        if let Some(missing) = formula
            .referenced_keys()
            .find(|key| !self.compounds.contains(key))
        {
            return Err(Error::unresolved(&formula.id, missing));
        }

        let registered = self.formulas.insert(formula)?;

        match registered.element_balance(|key| self.compounds.get(key).ok()) {
            Some(balance) if !balance.is_balanced() => {
                tracing::warn!(
                    formula = %registered.id,
                    delta = %balance,
                    "registered formula does not conserve elements"
                );
            }
            _ => tracing::debug!(formula = %registered.id, "registered formula"),
        }

        Ok(registered)
    }

    pub fn get(&self, id: &str) -> Result<Arc<Formula>, Error> {
        self.formulas.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.formulas.contains(id)
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }

    /// All formulas in registration order.
    pub fn snapshot(&self) -> Vec<Arc<Formula>> {
        self.formulas.snapshot()
    }

    /// Formulas with `compound` among their outputs, in registration order.
    pub fn producing(&self, compound: &str) -> Vec<Arc<Formula>> {
        self.formulas
            .snapshot()
            .into_iter()
            .filter(|f| f.produces(compound))
            .collect()
    }

    pub fn on_load_complete<F>(&self, callback: F)
    where
        F: FnOnce(&LoadSummary) + Send + 'static,
    {
        self.formulas.on_load_complete(callback);
    }

    pub fn load(&self) -> LoadSummary {
        self.formulas.load()
    }

    pub fn is_loaded(&self) -> bool {
        self.formulas.is_loaded()
    }

    pub fn batch(&self) -> u64 {
        self.formulas.batch()
    }
}

fn validate_sides(formula: &Formula) -> Result<(), Error> {
    let invalid = |reason: String| Error::invalid(EntryKind::Formula, &formula.id, reason);

    if formula.inputs.is_empty() {
        return Err(invalid("formula has no inputs".into()));
    }
    if formula.outputs.is_empty() {
        return Err(invalid("formula has no outputs".into()));
    }

    let bad_quantity = |r: &&Reagent| !r.quantity.is_finite() || r.quantity <= 0.0;
    if let Some(r) = formula
        .inputs
        .iter()
        .chain(formula.outputs.iter())
        .find(bad_quantity)
    {
        return Err(invalid(format!(
            "quantity of '{}' must be positive, got {}",
            r.compound, r.quantity
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::compound::Compound;

    fn registries() -> FormulaRegistry {
        let compounds = Arc::new(CompoundRegistry::new());
        for (key, name, formula) in [
            ("H2O", "Water", "H2O"),
            ("NaCl", "Salt", "NaCl"),
            ("Brine", "Brine", "H2ONaCl"),
        ] {
            compounds
                .register(Compound::new(key, name, formula).unwrap())
                .unwrap();
        }
        compounds.load();
        FormulaRegistry::new(compounds)
    }

    fn brine(id: &str) -> Formula {
        Formula::new(
            id,
            vec![Reagent::new("H2O", 1.0), Reagent::new("NaCl", 1.0)],
            vec![Reagent::new("Brine", 1.0)],
        )
    }

    #[test]
    fn registers_formula_over_known_compounds() {
        let reg = registries();
        let f = reg.register(brine("brine")).unwrap();
        assert_eq!(f.id, "brine");
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.producing("Brine").len(), 1);
        assert!(reg.producing("H2O").is_empty());
    }

    #[test]
    fn unknown_compound_rejects_whole_formula() {
        let reg = registries();
        let formula = Formula::new(
            "transmute",
            vec![Reagent::new("H2O", 1.0)],
            vec![Reagent::new("Unobtainium", 1.0)],
        );

        let err = reg.register(formula).unwrap_err();

        assert_eq!(err, Error::unresolved("transmute", "Unobtainium"));
        assert!(err.to_string().contains("Unobtainium"));
        assert_eq!(reg.len(), 0);
        assert!(!reg.contains("transmute"));
    }

    #[test]
    fn duplicate_formula_id_is_rejected() {
        let reg = registries();
        reg.register(brine("brine")).unwrap();
        assert_eq!(
            reg.register(brine("brine")).unwrap_err(),
            Error::duplicate(EntryKind::Formula, "brine")
        );
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn empty_sides_and_bad_quantities_are_invalid() {
        let reg = registries();
        let no_outputs = Formula::new("void", vec![Reagent::new("H2O", 1.0)], vec![]);
        assert!(matches!(
            reg.register(no_outputs),
            Err(Error::InvalidDefinition { .. })
        ));

        let negative = Formula::new(
            "negative",
            vec![Reagent::new("H2O", -1.0)],
            vec![Reagent::new("Brine", 1.0)],
        );
        assert!(matches!(
            reg.register(negative),
            Err(Error::InvalidDefinition { .. })
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn unbalanced_formulas_are_still_registered() {
        let reg = registries();
        let lossy = Formula::new(
            "evaporate",
            vec![Reagent::new("Brine", 1.0)],
            vec![Reagent::new("NaCl", 1.0)],
        );
        assert!(reg.register(lossy).is_ok());
    }
}
