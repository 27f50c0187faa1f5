use std::sync::Arc;

use thiserror::Error;

use super::compound::Compound;
use super::container::ContainerState;
use super::formula::{Formula, Reagent};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReactionError {
    #[error("recipe '{formula}' needs {required} of '{compound}' but no container can supply it")]
    MissingReagent {
        formula: String,
        compound: String,
        required: f64,
    },

    #[error("recipe '{formula}' produces {produced} of '{compound}' but no container can hold it")]
    NoVessel {
        formula: String,
        compound: String,
        produced: f64,
    },
}

/// What the host renders for a station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationDisplay {
    /// Translated compound name.
    pub title: String,
    /// Subscripted formula label, e.g. `H₂O`.
    pub label: String,
}

/// An executable production path of a station, wrapping one formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    formula: Arc<Formula>,
}

impl Recipe {
    pub fn new(formula: Arc<Formula>) -> Self {
        Self { formula }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.formula.id
    }

    pub fn formula(&self) -> &Arc<Formula> {
        &self.formula
    }

    /// Runs the formula once against `containers`: every input is drawn from
    /// the first container of that compound able to supply it, every output
    /// is stored in the first container of that compound able to hold it.
    ///
    /// Either every transfer succeeds or `containers` is left untouched.
    /// Mass containers move mass; percentage containers treat the quantity
    /// as a volume in capacity units.
    pub fn apply(&self, containers: &mut [ContainerState]) -> Result<(), ReactionError> {
        let mut staged: Vec<ContainerState> = containers.to_vec();

        for reagent in &self.formula.inputs {
            if !transfer(&mut staged, reagent, withdraw) {
                return Err(ReactionError::MissingReagent {
                    formula: self.formula.id.clone(),
                    compound: reagent.compound.clone(),
                    required: reagent.quantity,
                });
            }
        }

        for product in &self.formula.outputs {
            if !transfer(&mut staged, product, deposit) {
                return Err(ReactionError::NoVessel {
                    formula: self.formula.id.clone(),
                    compound: product.compound.clone(),
                    produced: product.quantity,
                });
            }
        }

        containers.clone_from_slice(&staged);
        Ok(())
    }
}

fn transfer(
    containers: &mut [ContainerState],
    reagent: &Reagent,
    op: fn(&mut ContainerState, f64) -> bool,
) -> bool {
    containers
        .iter_mut()
        .filter(|c| c.compound().key() == reagent.compound)
        .any(|c| op(c, reagent.quantity))
}

fn withdraw(container: &mut ContainerState, quantity: f64) -> bool {
    match container {
        ContainerState::Mass(c) => c.remove(quantity).is_ok(),
        ContainerState::Percentage(c) => {
            let points = c.points_for(quantity);
            c.remove(points).is_ok()
        }
    }
}

fn deposit(container: &mut ContainerState, quantity: f64) -> bool {
    match container {
        ContainerState::Mass(c) => c.add(quantity).is_ok(),
        ContainerState::Percentage(c) => {
            let points = c.points_for(quantity);
            c.add(points).is_ok()
        }
    }
}

/// Interactive processing station exposing one compound, with every formula
/// producing that compound attached as a recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionStation {
    id: String,
    compound: Arc<Compound>,
    display: StationDisplay,
    recipes: Vec<Recipe>,
}

impl ReactionStation {
    pub fn new(namespace: &str, compound: Arc<Compound>, title: String) -> Self {
        let display = StationDisplay {
            title,
            label: compound.label(),
        };
        Self {
            id: station_id(namespace, compound.key()),
            compound,
            display,
            recipes: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn compound(&self) -> &Arc<Compound> {
        &self.compound
    }

    pub fn display(&self) -> &StationDisplay {
        &self.display
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn recipe(&self, formula_id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id() == formula_id)
    }

    pub(crate) fn push_recipe(&mut self, recipe: Recipe) {
        self.recipes.push(recipe);
    }
}

/// Station identifier for a compound key: `"<namespace>_<key>"`.
pub fn station_id(namespace: &str, compound_key: &str) -> String {
    format!("{}_{}", namespace, compound_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::container::{
        ContainerType, MassContainer, PercentageContainer, PhysicalState, SealStatus,
    };

    fn compound(key: &str, formula: &str) -> Arc<Compound> {
        Arc::new(Compound::new(key, key, formula).unwrap())
    }

    fn beaker(c: &Arc<Compound>, capacity: f64, mass: f64) -> ContainerState {
        MassContainer::new(
            c.clone(),
            capacity,
            mass,
            SealStatus::Unsealed,
            PhysicalState::Liquid,
            ContainerType::Beaker,
        )
        .unwrap()
        .into()
    }

    fn brine_recipe() -> Recipe {
        Recipe::new(Arc::new(Formula::new(
            "brine",
            vec![Reagent::new("H2O", 1.0), Reagent::new("NaCl", 1.0)],
            vec![Reagent::new("Brine", 1.0)],
        )))
    }

    #[test]
    fn station_id_uses_namespace_prefix() {
        let water = compound("H2O", "H2O");
        let station = ReactionStation::new("solution", water, "Water".into());
        assert_eq!(station.id(), "solution_H2O");
        assert_eq!(station.display().title, "Water");
        assert_eq!(station.display().label, "H₂O");
        assert!(station.recipes().is_empty());
    }

    #[test]
    fn apply_moves_reagents_into_products() {
        let (water, salt, brine) = (
            compound("H2O", "H2O"),
            compound("NaCl", "NaCl"),
            compound("Brine", "H2ONaCl"),
        );
        let mut containers = vec![
            beaker(&water, 5.0, 3.0),
            beaker(&salt, 5.0, 2.0),
            beaker(&brine, 5.0, 0.0),
        ];

        brine_recipe().apply(&mut containers).unwrap();

        assert_eq!(containers[0].mass(), Ok(2.0));
        assert_eq!(containers[1].mass(), Ok(1.0));
        assert_eq!(containers[2].mass(), Ok(1.0));
    }

    #[test]
    fn apply_is_all_or_nothing() {
        let (water, salt, brine) = (
            compound("H2O", "H2O"),
            compound("NaCl", "NaCl"),
            compound("Brine", "H2ONaCl"),
        );
        let mut containers = vec![
            beaker(&water, 5.0, 3.0),
            beaker(&salt, 5.0, 2.0),
            beaker(&brine, 5.0, 5.0),
        ];
        let before = containers.clone();

        let err = brine_recipe().apply(&mut containers).unwrap_err();
        assert!(matches!(err, ReactionError::NoVessel { ref compound, .. } if compound == "Brine"));
        assert_eq!(containers, before);

        let mut dry = vec![beaker(&water, 5.0, 3.0), beaker(&brine, 5.0, 0.0)];
        let err = brine_recipe().apply(&mut dry).unwrap_err();
        assert!(
            matches!(err, ReactionError::MissingReagent { ref compound, .. } if compound == "NaCl")
        );
        assert_eq!(dry[0].mass(), Ok(3.0));
    }

    #[test]
    fn apply_converts_volume_for_gas_containers() {
        let (h2, o2, water) = (
            compound("H2", "H2"),
            compound("O2", "O2"),
            compound("H2O", "H2O"),
        );
        let gas = |c: &Arc<Compound>, pct: f64| -> ContainerState {
            PercentageContainer::new(
                c.clone(),
                20.0,
                pct,
                SealStatus::Unsealed,
                PhysicalState::Gas,
                ContainerType::Cylinder,
            )
            .unwrap()
            .into()
        };
        let recipe = Recipe::new(Arc::new(Formula::new(
            "combustion",
            vec![Reagent::new("H2", 2.0), Reagent::new("O2", 1.0)],
            vec![Reagent::new("H2O", 2.0)],
        )));
        let mut containers = vec![gas(&h2, 50.0), gas(&o2, 50.0), beaker(&water, 5.0, 0.0)];

        recipe.apply(&mut containers).unwrap();

        assert_eq!(containers[0].percentage(), Ok(40.0));
        assert_eq!(containers[1].percentage(), Ok(45.0));
        assert_eq!(containers[2].mass(), Ok(2.0));
    }
}
