use std::io::Write;

use serde::{Deserialize, Serialize};

use super::{Error, Format};
use crate::model::formula::Reagent;
use crate::model::station::{ReactionStation, Recipe};
use crate::registry::StationTable;

/// Serialized form of a compiled station table, for the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationTableRecord {
    pub namespace: String,
    #[serde(default, rename = "station")]
    pub stations: Vec<StationRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub id: String,
    pub compound: String,
    pub title: String,
    pub label: String,
    /// g/mol
    pub molar_mass: f64,
    #[serde(default)]
    pub recipes: Vec<RecipeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    pub id: String,
    pub inputs: Vec<Reagent>,
    pub outputs: Vec<Reagent>,
}

impl From<&Recipe> for RecipeRecord {
    fn from(recipe: &Recipe) -> Self {
        let formula = recipe.formula();
        Self {
            id: formula.id.clone(),
            inputs: formula.inputs.clone(),
            outputs: formula.outputs.clone(),
        }
    }
}

impl From<&ReactionStation> for StationRecord {
    fn from(station: &ReactionStation) -> Self {
        let compound = station.compound();
        Self {
            id: station.id().to_string(),
            compound: compound.key().to_string(),
            title: station.display().title.clone(),
            label: station.display().label.clone(),
            molar_mass: round_mass(compound.molar_mass()),
            recipes: station.recipes().iter().map(RecipeRecord::from).collect(),
        }
    }
}

impl From<&StationTable> for StationTableRecord {
    fn from(table: &StationTable) -> Self {
        Self {
            namespace: table.namespace().to_string(),
            stations: table.iter().map(|s| StationRecord::from(s.as_ref())).collect(),
        }
    }
}

fn round_mass(mass: f64) -> f64 {
    (mass * 1000.0).round() / 1000.0
}

pub fn write_stations<W: Write>(
    mut writer: W,
    table: &StationTable,
    format: Format,
) -> Result<(), Error> {
    let record = StationTableRecord::from(table);
    let content = match format {
        Format::Toml => {
            toml::to_string_pretty(&record).map_err(|e| Error::serialize(format, e.to_string()))?
        }
        Format::Json => serde_json::to_string_pretty(&record)
            .map_err(|e| Error::serialize(format, e.to_string()))?,
    };
    writer.write_all(content.as_bytes())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::{TranslationTable, compile};
    use crate::model::compound::Compound;
    use crate::model::formula::Formula;
    use crate::registry::Registries;

    fn brine_table() -> std::sync::Arc<StationTable> {
        let registries = Registries::new();
        for (key, name, formula) in [
            ("H2O", "Water", "H2O"),
            ("NaCl", "Salt", "NaCl"),
            ("Brine", "Brine", "H2ONaCl"),
        ] {
            registries
                .compounds
                .register(Compound::new(key, name, formula).unwrap())
                .unwrap();
        }
        registries
            .formulas
            .register(Formula::new(
                "brine",
                vec![Reagent::new("H2O", 1.0), Reagent::new("NaCl", 1.0)],
                vec![Reagent::new("Brine", 1.0)],
            ))
            .unwrap();
        compile(&registries, "solution", &TranslationTable::default()).unwrap()
    }

    #[test]
    fn json_output_lists_stations_in_order() {
        let table = brine_table();
        let mut out = Vec::new();
        write_stations(&mut out, &table, Format::Json).unwrap();

        let record: StationTableRecord = serde_json::from_slice(&out).unwrap();
        assert_eq!(record.namespace, "solution");
        let ids: Vec<_> = record.stations.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["solution_H2O", "solution_NaCl", "solution_Brine"]);
        assert_eq!(record.stations[2].recipes[0].id, "brine");
        assert_eq!(record.stations[0].label, "H₂O");
        assert_eq!(record.stations[0].molar_mass, 18.015);
    }

    #[test]
    fn toml_output_parses_back() {
        let table = brine_table();
        let mut out = Vec::new();
        write_stations(&mut out, &table, Format::Toml).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[[station]]"));
        let record: StationTableRecord = toml::from_str(&text).unwrap();
        assert_eq!(record, StationTableRecord::from(table.as_ref()));
    }
}
