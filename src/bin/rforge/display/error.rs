use std::io::{self, Write};

use anyhow::Error;

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    for line in wrap(&err.to_string(), 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    let mut source = err.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 57) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
        source = cause.source();
    }

    if let Some(hints) = HintCollector::collect(err) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

struct HintCollector {
    hints: Vec<String>,
    has_typed_hints: bool,
}

impl HintCollector {
    fn collect(err: &Error) -> Option<Vec<String>> {
        let mut collector = Self {
            hints: Vec::new(),
            has_typed_hints: false,
        };

        for cause in err.chain() {
            if let Some(io_err) = cause.downcast_ref::<reagent_forge::io::Error>() {
                collector.collect_io_hints(io_err);
            } else if let Some(forge_err) = cause.downcast_ref::<reagent_forge::ForgeError>() {
                collector.collect_forge_hints(forge_err);
            } else if let Some(reg_err) = cause.downcast_ref::<reagent_forge::RegistryError>() {
                collector.collect_registry_hints(reg_err);
            }
            if collector.has_typed_hints {
                break;
            }
        }

        if !collector.has_typed_hints {
            collector.collect_fallback_hints(err);
        }

        if collector.hints.is_empty() {
            None
        } else {
            Some(collector.hints)
        }
    }

    fn add(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }

    fn mark_typed(&mut self) {
        self.has_typed_hints = true;
    }

    fn collect_io_hints(&mut self, io_err: &reagent_forge::io::Error) {
        use reagent_forge::io::Error as IoError;

        self.mark_typed();

        match io_err {
            IoError::Io { source } => self.collect_std_io_hints(source),

            IoError::Parse { format, .. } => {
                self.add(format!("The catalog is not valid {format}"));
                self.add("Compounds are [[compound]] tables with key, name and formula");
                self.add("Formulas are [[formula]] tables with id, inputs and outputs");
                self.add("Use --infmt if the file extension does not match its content");
            }

            IoError::Serialize { format, .. } => {
                self.add(format!("The station table could not be encoded as {format}"));
                self.add("Try the other output format (.toml or .json)");
            }

            IoError::UnknownFormat(_) => {
                self.add("Supported formats: toml, json");
                self.add("Use --infmt to set the catalog format explicitly");
            }
        }
    }

    fn collect_std_io_hints(&mut self, source: &std::io::Error) {
        use std::io::ErrorKind;

        match source.kind() {
            ErrorKind::NotFound => {
                self.add("File or directory not found");
                self.add("Check the path spelling and ensure the file exists");
            }

            ErrorKind::PermissionDenied => {
                self.add("Permission denied accessing the file");
                self.add("Check file permissions with `ls -la`");
            }

            ErrorKind::InvalidData => {
                self.add("File is not valid UTF-8 text");
            }

            ErrorKind::BrokenPipe => {
                self.add("Output consumer terminated early");
                self.add("This may occur when piping to commands like `head`");
            }

            _ => {
                self.add("I/O operation failed");
                self.add("Check file path, permissions, and disk space");
            }
        }
    }

    fn collect_forge_hints(&mut self, forge_err: &reagent_forge::ForgeError) {
        use reagent_forge::ForgeError;

        self.mark_typed();

        match forge_err {
            ForgeError::MissingStation { formula, compound } => {
                self.add(format!(
                    "Formula '{formula}' produces '{compound}', which has no station"
                ));
                self.add("This indicates inconsistent registries; please report it");
            }

            ForgeError::StationCollision { key } => {
                self.add(format!("Compound '{key}' was compiled into two stations"));
                self.add("This indicates inconsistent registries; please report it");
            }

            ForgeError::WaveInFlight => {
                self.add("Another load wave is still compiling");
                self.add("Wait for the previous wave before submitting a new one");
            }

            ForgeError::Worker(_) | ForgeError::WorkerPool(_) => {
                self.add("The background compilation pool failed");
                self.add("Try a lower --workers count");
            }

            ForgeError::CatalogParse(_) => {
                self.add("The catalog TOML has invalid syntax or fields");
                self.add("Check for missing quotes, brackets, or misspelled keys");
            }

            ForgeError::TranslationParse(_) => {
                self.add("The --names file must contain a [names] table");
                self.add("Each entry maps a compound key to a display name");
            }

            ForgeError::Registry(reg_err) => self.collect_registry_hints(reg_err),
        }
    }

    fn collect_registry_hints(&mut self, reg_err: &reagent_forge::RegistryError) {
        use reagent_forge::RegistryError;

        self.mark_typed();

        match reg_err {
            RegistryError::Duplicate { kind, key } => {
                self.add(format!("The {kind} key '{key}' appears more than once"));
                self.add("Keys must be unique; the first definition is kept");
            }

            RegistryError::NotFound { kind, key } => {
                self.add(format!("No {kind} named '{key}' is registered"));
            }

            RegistryError::UnresolvedReference { compound, .. } => {
                self.add(format!("Add a [[compound]] entry with key = \"{compound}\""));
                self.add("Or fix the spelling of the compound key in the formula");
            }

            RegistryError::InvalidDefinition { .. } => {
                self.add("Keys use ASCII letters, digits, '_' or '-'");
                self.add("Formulas need at least one input and one output");
                self.add("Quantities must be positive numbers");
            }
        }
    }

    fn collect_fallback_hints(&mut self, err: &Error) {
        let msg = error_chain_text(err);

        if msg.contains("stdin") || msg.contains("terminal") {
            self.add("Pipe a catalog into rforge or pass it with -i/--catalog");
            return;
        }

        if msg.contains("rejected") {
            self.add("Run `rforge check -i <CATALOG>` to list the rejected entries");
            return;
        }

        if msg.contains("conserve elements") {
            self.add("Adjust reagent quantities so both sides carry the same atoms");
            self.add("Drop --strict to accept unbalanced formulas");
        }
    }
}

fn error_chain_text(err: &Error) -> String {
    err.chain()
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase()
}
