use anyhow::{Result, bail};

use reagent_forge::Registries;

use super::wave::{WaveOutcome, run_wave};
use crate::cli::CheckArgs;
use crate::display::{
    BalanceRow, Context as DisplayContext, Progress, print_balance_table, print_rejections,
    print_wave_summary,
};
use crate::util::text::plural;

const TOTAL_STEPS: u8 = 4;

pub fn run_check(args: CheckArgs, ctx: DisplayContext) -> Result<()> {
    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);
    let WaveOutcome {
        coordinator,
        report,
    } = run_wave(&args.catalog, &mut progress)?;

    progress.step("Checking element balance");
    let rows = balance_rows(coordinator.registries());
    let unbalanced = rows.iter().filter(|r| !r.balanced).count();
    progress.complete_step(
        "Checking element balance",
        &[
            plural(rows.len(), "formula"),
            format!("{unbalanced} unbalanced"),
        ],
    );

    if ctx.interactive {
        print_wave_summary(&report);
        print_balance_table(&rows);
        print_rejections(&report);
    }

    let rejected = report.rejected_compounds.len() + report.rejected_formulas.len();
    if rejected > 0 {
        bail!("catalog has {rejected} rejected entries");
    }
    if args.strict && unbalanced > 0 {
        bail!("{} do not conserve elements (--strict)", plural(unbalanced, "formula"));
    }

    progress.finish();
    Ok(())
}

fn balance_rows(registries: &Registries) -> Vec<BalanceRow> {
    let compounds = &registries.compounds;
    registries
        .formulas
        .snapshot()
        .iter()
        .filter_map(|formula| {
            let balance = formula.element_balance(|key| compounds.get(key).ok())?;
            if !balance.is_balanced() {
                tracing::warn!(formula = %formula.id, delta = %balance, "unbalanced formula");
            }
            Some(BalanceRow {
                formula: formula.id.clone(),
                equation: formula.to_string(),
                balanced: balance.is_balanced(),
                delta: balance.to_string(),
            })
        })
        .collect()
}
