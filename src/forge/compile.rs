use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::map::Entry;

use super::error::Error;
use super::translate::Translator;
use crate::model::compound::Compound;
use crate::model::formula::Formula;
use crate::model::station::{ReactionStation, Recipe};
use crate::registry::{Registries, StationTable};

/// Builds a station table from the current registry contents and publishes
/// it. On failure the previously published table stays in place.
///
/// Passes over the same registries are serialized.
pub fn compile(
    registries: &Registries,
    namespace: &str,
    translator: &dyn Translator,
) -> Result<Arc<StationTable>, Error> {
    let _pass = registries.stations.compile_guard();

    // Formulas first: every output of a registered formula was a registered
    // compound before it, and compounds are never removed.
    let formulas = registries.formulas.snapshot();
    let compounds = registries.compounds.snapshot();

    match build_table(&compounds, &formulas, namespace, translator) {
        Ok(table) => {
            tracing::info!(
                namespace,
                stations = table.len(),
                recipes = table.recipe_count(),
                "published station table"
            );
            Ok(registries.stations.publish(table))
        }
        Err(e) => {
            tracing::error!(namespace, error = %e, "station compilation failed");
            Err(e)
        }
    }
}

/// One station per compound, then one recipe per (formula, output) pair.
pub(crate) fn build_table(
    compounds: &[Arc<Compound>],
    formulas: &[Arc<Formula>],
    namespace: &str,
    translator: &dyn Translator,
) -> Result<StationTable, Error> {
    let mut staging: IndexMap<String, ReactionStation> = IndexMap::with_capacity(compounds.len());

    for compound in compounds {
        match staging.entry(compound.key().to_string()) {
            Entry::Occupied(_) => return Err(Error::station_collision(compound.key())),
            Entry::Vacant(slot) => {
                let title = translator.translate(compound);
                slot.insert(ReactionStation::new(namespace, Arc::clone(compound), title));
            }
        }
    }

    for formula in formulas {
        for output in &formula.outputs {
            let station = staging
                .get_mut(&output.compound)
                .ok_or_else(|| Error::missing_station(&formula.id, &output.compound))?;
            station.push_recipe(Recipe::new(Arc::clone(formula)));
        }
    }

    Ok(StationTable::new(namespace, staging.into_values().collect()))
}
