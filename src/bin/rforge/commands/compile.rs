use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use reagent_forge::StationTable;
use reagent_forge::io::{Format, write_stations};

use super::wave::{WaveOutcome, run_wave};
use crate::cli::CompileArgs;
use crate::display::{
    Context as DisplayContext, Progress, print_rejections, print_station_table, print_wave_summary,
};
use crate::io::{create_output, resolve_format};

const TOTAL_STEPS: u8 = 4;

struct OutputSpec {
    path: Option<PathBuf>,
    format: Format,
}

pub fn run_compile(args: CompileArgs, ctx: DisplayContext) -> Result<()> {
    let outputs = resolve_outputs(&args)?;

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);
    let WaveOutcome { report, .. } = run_wave(&args.catalog, &mut progress)?;

    if ctx.interactive {
        print_wave_summary(&report);
        print_station_table(&report.table);
        print_rejections(&report);
    }

    if args.strict && !report.is_clean() {
        bail!(
            "{} catalog entries were rejected (--strict)",
            report.rejected_compounds.len() + report.rejected_formulas.len()
        );
    }

    progress.step("Writing station table");
    write_outputs(&report.table, &outputs)?;
    let substeps: Vec<String> = outputs.iter().map(describe_output).collect();
    progress.complete_step("Writing station table", &substeps);

    progress.finish();
    Ok(())
}

fn resolve_outputs(args: &CompileArgs) -> Result<Vec<OutputSpec>> {
    if args.output.is_empty() {
        return Ok(vec![OutputSpec {
            path: None,
            format: args.outfmt.into(),
        }]);
    }

    args.output
        .iter()
        .map(|path| {
            Ok(OutputSpec {
                format: resolve_format(path, None)?,
                path: Some(path.clone()),
            })
        })
        .collect()
}

fn write_outputs(table: &StationTable, outputs: &[OutputSpec]) -> Result<()> {
    for spec in outputs {
        let writer = create_output(spec.path.as_deref())?;
        write_stations(writer, table, spec.format).with_context(|| {
            format!("Failed to write {} station table to {}", spec.format, target_name(spec))
        })?;
    }
    Ok(())
}

fn target_name(spec: &OutputSpec) -> String {
    spec.path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdout".to_string())
}

fn describe_output(spec: &OutputSpec) -> String {
    let name = spec
        .path
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "stdout".to_string());
    format!("{} → {}", spec.format, name)
}
