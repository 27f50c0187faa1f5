use std::io::{self, Write};

use reagent_forge::{RegistryError, StationTable, WaveReport};

use crate::util::text::truncate;

const INDENT: &str = "      ";

const BOX_INNER_WIDTH: usize = 62;
const SAFE_TABLE_WIDTH: usize = BOX_INNER_WIDTH - INDENT.len();
const MAX_ROWS: usize = 20;

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Column {
    header: &'static str,
    width: usize,
    align: Align,
}

impl Column {
    const fn left(header: &'static str, width: usize) -> Self {
        Self {
            header,
            width,
            align: Align::Left,
        }
    }

    const fn right(header: &'static str, width: usize) -> Self {
        Self {
            header,
            width,
            align: Align::Right,
        }
    }

    fn cell(&self, value: &str) -> String {
        let value = truncate(value, self.width);
        match self.align {
            Align::Left => format!("{:<w$}", value, w = self.width),
            Align::Right => format!("{:>w$}", value, w = self.width),
        }
    }
}

pub struct BalanceRow {
    pub formula: String,
    pub equation: String,
    pub balanced: bool,
    pub delta: String,
}

pub fn print_wave_summary(report: &WaveReport) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let rows = [
        ("Batch", report.batch.to_string()),
        ("Compounds", report.compounds_registered.to_string()),
        ("Formulas", report.formulas_registered.to_string()),
        (
            "Rejected",
            (report.rejected_compounds.len() + report.rejected_formulas.len()).to_string(),
        ),
        ("Stations", report.stations().to_string()),
        ("Recipes", report.recipes().to_string()),
    ];

    let val_w = SAFE_TABLE_WIDTH.saturating_sub(16 + 6);
    let columns = [Column::left("Metric", 16), Column::right("Value", val_w)];
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|(k, v)| vec![k.to_string(), v.clone()])
        .collect();
    print_grid(&mut out, "Wave Summary", &columns, &rows);
}

pub fn print_station_table(table: &StationTable) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let columns = [
        Column::left("Station", 18),
        Column::left("Title", 16),
        Column::left("Formula", 10),
        Column::right("Recipes", 7),
    ];
    let rows: Vec<Vec<String>> = table
        .iter()
        .map(|station| {
            let display = station.display();
            vec![
                station.id().to_string(),
                display.title.clone(),
                display.label.clone(),
                station.recipes().len().to_string(),
            ]
        })
        .collect();

    print_grid(
        &mut out,
        &format!("Stations ({})", table.namespace()),
        &columns,
        &rows,
    );
}

pub fn print_rejections(report: &WaveReport) {
    if report.is_clean() {
        return;
    }

    let stderr = io::stderr();
    let mut out = stderr.lock();

    let columns = [
        Column::left("Entry", 16),
        Column::left("Reason", SAFE_TABLE_WIDTH.saturating_sub(16 + 6)),
    ];
    let rows: Vec<Vec<String>> = report
        .rejected_compounds
        .iter()
        .chain(report.rejected_formulas.iter())
        .map(|e| vec![e.key().to_string(), rejection_reason(e)])
        .collect();

    print_grid(&mut out, "Rejected Entries", &columns, &rows);
}

fn rejection_reason(err: &RegistryError) -> String {
    match err {
        RegistryError::Duplicate { kind, .. } => format!("duplicate {kind}"),
        RegistryError::NotFound { kind, .. } => format!("unknown {kind}"),
        RegistryError::UnresolvedReference { compound, .. } => {
            format!("unknown compound '{compound}'")
        }
        RegistryError::InvalidDefinition { reason, .. } => reason.clone(),
    }
}

pub fn print_balance_table(rows: &[BalanceRow]) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let columns = [
        Column::left("Formula", 16),
        Column::left("Reaction", 26),
        Column::left("Balance", 10),
    ];
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            let status = if r.balanced {
                "✓".to_string()
            } else {
                r.delta.clone()
            };
            vec![r.formula.clone(), r.equation.clone(), status]
        })
        .collect();

    print_grid(&mut out, "Element Balance", &columns, &rows);
}

fn print_grid(out: &mut impl Write, title: &str, columns: &[Column], rows: &[Vec<String>]) {
    let rule = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = columns.iter().map(|c| "─".repeat(c.width + 2)).collect();
        format!("{}{}{}{}", INDENT, left, segments.join(mid), right)
    };
    let line = |cells: Vec<String>| format!("{}│ {} │", INDENT, cells.join(" │ "));

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(out, "{}", rule("┌", "┬", "┐"));
    let _ = writeln!(
        out,
        "{}",
        line(columns.iter().map(|c| c.cell(c.header)).collect())
    );
    let _ = writeln!(out, "{}", rule("├", "┼", "┤"));

    for row in rows.iter().take(MAX_ROWS) {
        let cells = columns
            .iter()
            .zip(row)
            .map(|(c, value)| c.cell(value))
            .collect();
        let _ = writeln!(out, "{}", line(cells));
    }

    if rows.len() > MAX_ROWS {
        let more = format!("({} more)", rows.len() - MAX_ROWS);
        let cells = columns
            .iter()
            .enumerate()
            .map(|(i, c)| c.cell(if i == 0 { "..." } else if i == 1 { more.as_str() } else { "" }))
            .collect();
        let _ = writeln!(out, "{}", line(cells));
    }

    let _ = writeln!(out, "{}", rule("└", "┴", "┘"));
}
