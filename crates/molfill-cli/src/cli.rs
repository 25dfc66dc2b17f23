use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu",
    version,
    about = "molfill CLI - Packs boxes, spheres and mesh volumes with copies of an atom or molecule under a minimum-separation constraint.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fill a shape with copies of the pattern read from an XYZ file.
    Fill(FillArgs),
}

/// Arguments for the `fill` subcommand.
#[derive(Args, Debug)]
pub struct FillArgs {
    // --- Core Arguments ---
    /// Path to the pattern structure file (XYZ).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output structure file (XYZ).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Path to the fill configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Fixed structure (XYZ) centered in the shape; copies are packed around it.
    #[arg(short, long, value_name = "PATH")]
    pub base: Option<PathBuf>,

    // --- Fill Overrides ---
    /// Override the number of copies to place: an integer, or 'fill' for as many as fit.
    #[arg(short = 'n', long, value_name = "N|fill")]
    pub num_molecules: Option<String>,

    /// Override the overlap tolerance in Angstroms.
    #[arg(short, long, value_name = "FLOAT")]
    pub tol: Option<f64>,

    /// Override the grid spacing in Angstroms (defaults to the tolerance).
    #[arg(long, value_name = "FLOAT")]
    pub spacing: Option<f64>,

    /// Override the attempt budget of the random filler.
    #[arg(long, value_name = "INT")]
    pub max_attempts: Option<usize>,

    /// Seed for random placement and orientation.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Override `fill.rand-fill` from the config file.
    #[command(flatten)]
    pub strategy: FillStrategy,

    /// Rotate every molecule to a random orientation before placing it.
    #[arg(long)]
    pub randomize_orient: bool,

    /// Size the placement from a target density in g/mL.
    #[arg(short, long, value_name = "FLOAT")]
    pub density: Option<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S fill.max-attempts=500
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// A group to handle mutually exclusive placement strategy flags.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = false, multiple = false)]
pub struct FillStrategy {
    /// Place copies by random sampling.
    #[arg(long)]
    pub rand_fill: bool,
    /// Place copies on a regular lattice.
    #[arg(long)]
    pub grid_fill: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fill_with_overrides() {
        let cli = Cli::parse_from([
            "molfill", "-vv", "fill", "-i", "in.xyz", "-o", "out.xyz", "-c", "fill.toml",
            "--num-molecules", "fill", "--tol", "0.5", "--rand-fill", "--seed", "7", "-S",
            "fill.max-attempts=20",
        ]);

        assert_eq!(cli.verbose, 2);
        let Commands::Fill(args) = cli.command;
        assert_eq!(args.input, PathBuf::from("in.xyz"));
        assert!(args.base.is_none());
        assert_eq!(args.num_molecules.as_deref(), Some("fill"));
        assert_eq!(args.tol, Some(0.5));
        assert!(args.strategy.rand_fill && !args.strategy.grid_fill);
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.set_values, vec!["fill.max-attempts=20".to_string()]);
    }

    #[test]
    fn parses_base_structure_path() {
        let cli = Cli::parse_from([
            "molfill", "fill", "-i", "in.xyz", "-o", "out.xyz", "-c", "fill.toml", "-b",
            "protein.xyz",
        ]);

        let Commands::Fill(args) = cli.command;
        assert_eq!(args.base, Some(PathBuf::from("protein.xyz")));
    }

    #[test]
    fn strategy_flags_are_mutually_exclusive() {
        let result = Cli::try_parse_from([
            "molfill", "fill", "-i", "a.xyz", "-o", "b.xyz", "-c", "c.toml", "--rand-fill",
            "--grid-fill",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from([
            "molfill", "-q", "-v", "fill", "-i", "a.xyz", "-o", "b.xyz", "-c", "c.toml",
        ]);
        assert!(result.is_err());
    }
}
