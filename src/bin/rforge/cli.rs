use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use reagent_forge::io::Format;

#[derive(Parser)]
#[command(
    name = "rforge",
    about = "Compile chemical catalogs into reaction stations",
    version,
    author,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RFORGE_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a load wave over a catalog and write the compiled station table
    #[command(visible_alias = "c")]
    Compile(CompileArgs),

    /// Validate a catalog without writing anything
    #[command(visible_alias = "k")]
    Check(CheckArgs),
}

impl Command {
    pub fn quiet(&self) -> bool {
        match self {
            Command::Compile(args) => args.catalog.quiet,
            Command::Check(args) => args.catalog.quiet,
        }
    }
}

/// Catalog input options shared by all commands.
#[derive(Args)]
pub struct CatalogOptions {
    /// Catalog file (embedded default catalog if omitted, `-` for stdin)
    #[arg(short = 'i', long = "catalog", value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Catalog format (inferred from extension if not specified)
    #[arg(long, value_name = "FORMAT")]
    pub infmt: Option<FormatArg>,

    /// Station namespace, the prefix of every station id
    #[arg(short, long, value_name = "NAME", default_value = reagent_forge::DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Compound name translations (TOML `[names]` table)
    #[arg(long, value_name = "FILE")]
    pub names: Option<PathBuf>,

    /// Worker threads for station compilation
    #[arg(short = 'j', long, value_name = "N", default_value = "2")]
    pub workers: usize,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct CompileArgs {
    #[command(flatten)]
    pub catalog: CatalogOptions,

    /// Output file(s), repeatable; format inferred from extension
    #[arg(short, long, value_name = "FILE", action = clap::ArgAction::Append)]
    pub output: Vec<PathBuf>,

    /// Format for stdout when no output file is given
    #[arg(long, value_name = "FORMAT", default_value = "toml")]
    pub outfmt: FormatArg,

    /// Fail if any catalog entry was rejected
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub catalog: CatalogOptions,

    /// Treat formulas that do not conserve elements as errors
    #[arg(long)]
    pub strict: bool,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum FormatArg {
    #[default]
    Toml,
    Json,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Toml => Format::Toml,
            FormatArg::Json => Format::Json,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
