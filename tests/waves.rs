use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use reagent_forge::{
    Batch, Catalog, Compound, Coordinator, ForgeConfig, ForgeError, Formula, Reagent, Registries,
    RegistryError, StationLookup, Translator,
};

fn brine_batch() -> Batch {
    Batch::new()
        .compound("H2O", "Water", "H2O")
        .compound("NaCl", "Sodium Chloride", "NaCl")
        .compound("Brine", "Brine", "H2ONaCl")
        .formula(Formula::new(
            "brine",
            vec![Reagent::new("H2O", 1.0), Reagent::new("NaCl", 1.0)],
            vec![Reagent::new("Brine", 1.0)],
        ))
}

/// Blocks every translation until the test releases the gate.
struct Gated {
    gate: Arc<Mutex<()>>,
}

impl Translator for Gated {
    fn translate(&self, compound: &Compound) -> String {
        let _open = self.gate.lock().unwrap_or_else(|e| e.into_inner());
        compound.name().to_string()
    }
}

/// Panics on every translation while armed.
struct Faulty {
    armed: AtomicBool,
}

impl Translator for Faulty {
    fn translate(&self, compound: &Compound) -> String {
        if self.armed.load(Ordering::Acquire) {
            panic!("no name for {}", compound.key());
        }
        compound.name().to_string()
    }
}

#[test]
fn brine_wave_yields_three_stations() {
    let coordinator = Coordinator::new(Registries::new(), &ForgeConfig::default()).unwrap();
    let report = coordinator.submit(brine_batch()).unwrap().wait().unwrap();

    let table = &report.table;
    assert_eq!(table.len(), 3);
    assert_eq!(table.namespace(), "solution");

    let brine = table.by_id("solution_Brine").unwrap();
    assert_eq!(brine.recipes().len(), 1);
    assert_eq!(brine.recipes()[0].id(), "brine");
    assert_eq!(brine.display().label, "H₂ONaCl");
    assert!(table.get("H2O").unwrap().recipes().is_empty());
    assert!(table.get("NaCl").unwrap().recipes().is_empty());
}

#[test]
fn unresolved_formula_is_reported_and_not_registered() {
    let registries = Registries::new();
    let coordinator = Coordinator::new(registries.clone(), &ForgeConfig::default()).unwrap();
    let batch = brine_batch().formula(Formula::new(
        "philosophers_stone",
        vec![Reagent::new("H2O", 1.0)],
        vec![Reagent::new("Unobtainium", 1.0)],
    ));

    let report = coordinator.submit(batch).unwrap().wait().unwrap();

    assert_eq!(
        report.rejected_formulas,
        vec![RegistryError::unresolved("philosophers_stone", "Unobtainium")]
    );
    assert_eq!(registries.formulas.len(), 1);
    assert!(!registries.formulas.contains("philosophers_stone"));
    assert_eq!(report.recipes(), 1);
}

#[test]
fn second_submit_while_compiling_is_rejected() {
    let gate = Arc::new(Mutex::new(()));
    let closed = gate.lock().unwrap();

    let registries = Registries::new();
    let coordinator = Coordinator::with_translator(
        registries.clone(),
        &ForgeConfig::default(),
        Arc::new(Gated {
            gate: Arc::clone(&gate),
        }),
    )
    .unwrap();

    let handle = coordinator.submit(brine_batch()).unwrap();
    assert!(coordinator.is_in_flight());
    assert!(matches!(
        coordinator.submit(Batch::new().compound("O2", "Oxygen", "O2")),
        Err(ForgeError::WaveInFlight)
    ));
    assert!(matches!(
        registries.stations.lookup("Brine"),
        StationLookup::Pending
    ));

    drop(closed);
    let report = handle.wait().unwrap();
    assert_eq!(report.stations(), 3);
    assert!(!coordinator.is_in_flight());
    assert!(matches!(
        registries.stations.lookup("Brine"),
        StationLookup::Ready(_)
    ));

    // The rejected submit registered nothing.
    assert!(!registries.compounds.contains("O2"));
    let next = coordinator
        .submit(Batch::new().compound("O2", "Oxygen", "O2"))
        .unwrap()
        .wait()
        .unwrap();
    assert_eq!(next.stations(), 4);
}

#[test]
fn readers_keep_the_previous_table_during_a_wave() {
    let gate = Arc::new(Mutex::new(()));
    let registries = Registries::new();
    let coordinator = Coordinator::with_translator(
        registries.clone(),
        &ForgeConfig::default(),
        Arc::new(Gated {
            gate: Arc::clone(&gate),
        }),
    )
    .unwrap();
    coordinator.submit(brine_batch()).unwrap().wait().unwrap();

    let closed = gate.lock().unwrap();
    let handle = coordinator
        .submit(Batch::new().compound("O2", "Oxygen", "O2"))
        .unwrap();

    let table = registries.stations.current().unwrap();
    assert_eq!(table.len(), 3);
    assert!(matches!(
        registries.stations.lookup("H2O"),
        StationLookup::Ready(_)
    ));
    assert!(matches!(
        registries.stations.lookup("O2"),
        StationLookup::Pending
    ));

    drop(closed);
    handle.wait().unwrap();
    assert!(matches!(
        registries.stations.lookup("O2"),
        StationLookup::Ready(_)
    ));
    assert!(matches!(
        registries.stations.lookup("Gold"),
        StationLookup::Absent
    ));
}

#[test]
fn compilation_sees_every_formula_of_its_wave() {
    let mut batch = Batch::new()
        .compound("H2", "Hydrogen", "H2")
        .compound("O2", "Oxygen", "O2")
        .compound("H2O", "Water", "H2O");
    for i in 0..250 {
        batch = batch.formula(Formula::new(
            format!("water_{i}"),
            vec![Reagent::new("H2", 2.0), Reagent::new("O2", 1.0)],
            vec![Reagent::new("H2O", 2.0)],
        ));
    }

    let coordinator = Coordinator::new(Registries::new(), &ForgeConfig::default()).unwrap();
    let report = coordinator.submit(batch).unwrap().wait().unwrap();

    let recipes: Vec<_> = report
        .table
        .get("H2O")
        .unwrap()
        .recipes()
        .iter()
        .map(|r| r.id().to_string())
        .collect();
    assert_eq!(recipes.len(), 250);
    assert_eq!(recipes[0], "water_0");
    assert_eq!(recipes[249], "water_249");
}

#[test]
fn embedded_catalog_loads_cleanly() {
    let config = ForgeConfig {
        namespace: "lab".to_string(),
        worker_threads: 1,
        ..ForgeConfig::default()
    };
    let coordinator = Coordinator::new(Registries::new(), &config).unwrap();
    let report = coordinator.submit_catalog().unwrap().wait().unwrap();

    let catalog = Catalog::embedded();
    assert!(report.is_clean());
    assert_eq!(report.stations(), catalog.compounds.len());
    assert!(report.table.by_id("lab_NaCl").is_some());
    // NaCl is produced by neutralization and salt synthesis.
    assert_eq!(report.table.get("NaCl").unwrap().recipes().len(), 2);
}

#[test]
fn translations_title_the_stations() {
    let config = ForgeConfig {
        translations: Some("[names]\nBrine = \"Salzlake\"".to_string()),
        ..ForgeConfig::default()
    };
    let coordinator = Coordinator::new(Registries::new(), &config).unwrap();
    let report = coordinator.submit(brine_batch()).unwrap().wait().unwrap();

    assert_eq!(report.table.get("Brine").unwrap().display().title, "Salzlake");
    assert_eq!(report.table.get("H2O").unwrap().display().title, "Water");
}

#[test]
fn malformed_translations_fail_construction() {
    let config = ForgeConfig {
        translations: Some("names = 3".to_string()),
        ..ForgeConfig::default()
    };
    assert!(matches!(
        Coordinator::new(Registries::new(), &config),
        Err(ForgeError::TranslationParse(_))
    ));
}

#[tokio::test]
async fn wave_can_be_joined_from_async_code() {
    let coordinator = Coordinator::new(Registries::new(), &ForgeConfig::default()).unwrap();
    let report = coordinator.submit(brine_batch()).unwrap().join().await.unwrap();
    assert_eq!(report.recipes(), 1);
}

#[test]
fn coordinators_sharing_registries_run_one_wave_at_a_time() {
    let gate = Arc::new(Mutex::new(()));
    let closed = gate.lock().unwrap();

    let registries = Registries::new();
    let first = Coordinator::with_translator(
        registries.clone(),
        &ForgeConfig::default(),
        Arc::new(Gated {
            gate: Arc::clone(&gate),
        }),
    )
    .unwrap();
    let second = Coordinator::new(registries.clone(), &ForgeConfig::default()).unwrap();

    let handle = first.submit(brine_batch()).unwrap();
    assert!(second.is_in_flight());
    assert!(matches!(
        second.submit(Batch::new().compound("O2", "Oxygen", "O2")),
        Err(ForgeError::WaveInFlight)
    ));
    assert!(!registries.compounds.contains("O2"));
    assert!(registries.stations.is_loading());
    assert!(matches!(
        registries.stations.lookup("O2"),
        StationLookup::Pending
    ));

    drop(closed);
    assert_eq!(handle.wait().unwrap().stations(), 3);
    assert!(!registries.stations.is_loading());

    let next = second
        .submit(Batch::new().compound("O2", "Oxygen", "O2"))
        .unwrap()
        .wait()
        .unwrap();
    assert_eq!(next.stations(), 4);
}

#[test]
fn failed_compilation_keeps_the_previous_table() {
    let registries = Registries::new();
    let translator = Arc::new(Faulty {
        armed: AtomicBool::new(false),
    });
    let coordinator = Coordinator::with_translator(
        registries.clone(),
        &ForgeConfig::default(),
        Arc::clone(&translator) as Arc<dyn Translator>,
    )
    .unwrap();
    let settled = coordinator.submit(brine_batch()).unwrap().wait().unwrap();

    translator.armed.store(true, Ordering::Release);
    let failed = coordinator
        .submit(Batch::new().compound("O2", "Oxygen", "O2"))
        .unwrap()
        .wait();

    assert!(matches!(failed, Err(ForgeError::Worker(_))));
    assert!(!coordinator.is_in_flight());
    assert!(Arc::ptr_eq(
        &registries.stations.current().unwrap(),
        &settled.table
    ));
    assert!(matches!(
        registries.stations.lookup("O2"),
        StationLookup::Absent
    ));

    translator.armed.store(false, Ordering::Release);
    let table = coordinator.recompile().unwrap();
    assert_eq!(table.len(), 4);
}
