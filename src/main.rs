use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

use vecsio::codec::ElementKind;
use vecsio::dataset;

#[derive(Parser)]
#[command(name = "vecsio", about = "Inspect and trim binary vector dataset files", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the shape of a vector file
    Info {
        /// Vector file to inspect
        file: PathBuf,

        /// Element kind (defaults from the file extension)
        #[arg(long, value_enum)]
        kind: Option<Kind>,
    },

    /// Copy the first N records of a dataset into a new file
    Trim {
        /// Source dataset file
        input: PathBuf,

        /// Destination file (must not be the input)
        output: PathBuf,

        /// Number of records to keep
        #[arg(long, short = 'n')]
        count: usize,

        /// Element kind (defaults from the input file extension)
        #[arg(long, value_enum)]
        kind: Option<Kind>,
    },

    /// List vector files under a directory with their shapes
    List {
        /// Directory to scan recursively
        dir: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    /// Signed 32-bit integers (.ivecs)
    I32,
    /// IEEE-754 32-bit floats (.fvecs)
    F32,
    /// Unsigned bytes (.bvecs)
    U8,
}

impl From<Kind> for ElementKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::I32 => ElementKind::Int32,
            Kind::F32 => ElementKind::Float32,
            Kind::U8 => ElementKind::Uint8,
        }
    }
}

fn init_tracing(cli: &Cli) {
    // --quiet silences everything; --verbose shows info-level diagnostics;
    // otherwise RUST_LOG decides, defaulting to warnings only.
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The extension default only exists at the CLI surface; the library API
/// always takes the element kind explicitly.
fn resolve_kind(path: &Path, explicit: Option<Kind>) -> Result<ElementKind, String> {
    if let Some(kind) = explicit {
        return Ok(kind.into());
    }
    dataset::kind_for_extension(path).ok_or_else(|| {
        format!(
            "cannot infer element kind from {}; pass --kind",
            path.display()
        )
    })
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { file, kind } => {
            let kind = resolve_kind(&file, kind)?;
            let (n, d) = dataset::shape(&file, kind)?;
            let bytes = std::fs::metadata(&file)?.len();
            println!("{}: [{} x {}] {}, {} bytes", file.display(), n, d, kind, bytes);
        }
        Commands::Trim {
            input,
            output,
            count,
            kind,
        } => {
            let kind = resolve_kind(&input, kind)?;
            info!(input = %input.display(), output = %output.display(), count, "trimming dataset");
            dataset::trim(&input, &output, count, kind)?;
            println!("{}: kept first {} records of {}", output.display(), count, input.display());
        }
        Commands::List { dir } => {
            let files = dataset::find_vecs_files(&dir);
            debug!(count = files.len(), "found vector files");
            for path in files {
                // The scanner only returns known extensions, so a listing
                // can trust them for the kind.
                let Some(kind) = dataset::kind_for_extension(&path) else {
                    continue;
                };
                match dataset::shape(&path, kind) {
                    Ok((n, d)) => println!("{}: [{} x {}] {}", path.display(), n, d, kind),
                    Err(e) => println!("{}: unreadable ({})", path.display(), e),
                }
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
