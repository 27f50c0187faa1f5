use anyhow::{Context, Result, bail};

use reagent_forge::io::read_catalog;
use reagent_forge::{Batch, Catalog, Coordinator, ForgeConfig, Registries, WaveReport};

use crate::cli::CatalogOptions;
use crate::display::Progress;
use crate::io::{is_stdin, open_input, read_text, resolve_format, stdin_is_tty};
use crate::util::text::plural;

pub struct WaveOutcome {
    pub coordinator: Coordinator,
    pub report: WaveReport,
}

/// Reads the catalog, registers it and waits for compilation. Takes three
/// progress steps.
pub fn run_wave(opts: &CatalogOptions, progress: &mut Progress) -> Result<WaveOutcome> {
    progress.step("Reading catalog");
    let (catalog, source) = read_input_catalog(opts)?;
    let config = build_forge_config(opts)?;
    progress.complete_step(
        "Reading catalog",
        &[
            format!("Source: {source}"),
            format!(
                "{}, {}",
                plural(catalog.compounds.len(), "compound"),
                plural(catalog.formulas.len(), "formula")
            ),
        ],
    );

    progress.step("Registering definitions");
    let coordinator = Coordinator::new(Registries::new(), &config)
        .context("Failed to set up the load coordinator")?;
    let handle = coordinator
        .submit(Batch::from(catalog))
        .context("Failed to start load wave")?;
    progress.complete_step(
        "Registering definitions",
        &[
            format!("Batch {}", handle.batch()),
            format!("Namespace '{}'", config.namespace),
        ],
    );

    progress.step("Compiling stations");
    let report = handle.wait().context("Station compilation failed")?;
    progress.complete_step(
        "Compiling stations",
        &[
            format!(
                "{} on {}",
                plural(report.stations(), "station"),
                plural(config.worker_threads.max(1), "worker")
            ),
            plural(report.recipes(), "recipe"),
        ],
    );

    Ok(WaveOutcome {
        coordinator,
        report,
    })
}

fn read_input_catalog(opts: &CatalogOptions) -> Result<(Catalog, String)> {
    let Some(path) = opts.catalog.as_deref() else {
        return Ok((Catalog::embedded().clone(), "embedded default".to_string()));
    };

    if is_stdin(path) {
        if opts.infmt.is_none() {
            bail!("Reading a catalog from stdin requires --infmt.");
        }
        if stdin_is_tty() {
            bail!(
                "Catalog '-' given but stdin is a terminal.\n\nUsage: rforge compile -i <CATALOG> or pipe data via stdin."
            );
        }
    }

    let format = resolve_format(path, opts.infmt.map(Into::into))?;
    let reader = open_input(path)?;
    let catalog = read_catalog(reader, format)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    Ok((catalog, format!("{} ({format})", path.display())))
}

fn build_forge_config(opts: &CatalogOptions) -> Result<ForgeConfig> {
    let translations = opts.names.as_deref().map(read_text).transpose()?;
    Ok(ForgeConfig {
        namespace: opts.namespace.clone(),
        worker_threads: opts.workers,
        catalog: None,
        translations,
    })
}
