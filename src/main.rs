use clap::{Parser, Subcommand};
use mpar::archive::{Archive, ArchiveOptions};
use mpar::format::MPAR_VERSION;
use std::path::{Component, Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "mpar", about = "MXPSQL's Portable Archive CLI")]
struct Cli {
    /// Log codec progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List archive contents
    #[command(name = "l")]
    List {
        archive: PathBuf,
    },
    /// Create an archive from files and directories
    #[command(name = "c")]
    Create {
        archive: PathBuf,
        #[arg(required = true, num_args = 1..)]
        input: Vec<PathBuf>,
        /// Format version to write
        #[arg(long, default_value_t = MPAR_VERSION)]
        format_version: u64,
        /// Global metadata as key=value (version 2 and later)
        #[arg(long = "meta", value_parser = parse_key_value)]
        meta: Vec<(String, String)>,
    },
    /// Add files to an existing archive, replacing same-named entries
    #[command(name = "a")]
    Append {
        archive: PathBuf,
        #[arg(required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },
    /// Extract an archive
    #[command(name = "x")]
    Extract {
        archive: PathBuf,
        #[arg(short = 'C', long, default_value = ".")]
        output_dir: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(e) = run(cli.command) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { archive } => {
            let ar = Archive::read_from(&archive)?;
            println!("Archive: {} (version {})", archive.display(), ar.loaded_version());
            println!("{:<40} {:>12} {:>10}", "Name", "Size", "CRC32");
            for (name, entry) in ar.entries().iter() {
                println!("{:<40} {:>12} {:>10}", name, entry.len(), format!("{:08x}", entry.crc32()));
            }
            for (key, value) in ar.extra_metadata() {
                println!("  meta  {key} = {value}");
            }
        }

        // ── Create ───────────────────────────────────────────────────────────
        Commands::Create { archive, input, format_version, meta } => {
            let mut ar = Archive::with_options(ArchiveOptions { writer_version: format_version })?;
            for (key, value) in meta {
                ar.set_extra(key, value);
            }
            add_inputs(&mut ar, &input, false)?;
            ar.write_to(&archive)?;
            println!("Created: {} ({} entries)", archive.display(), ar.len());
        }

        // ── Append ───────────────────────────────────────────────────────────
        Commands::Append { archive, input } => {
            let mut ar = Archive::read_from(&archive)?;
            ar.set_writer_version(ar.loaded_version().max(1))?;
            add_inputs(&mut ar, &input, true)?;
            ar.write_to(&archive)?;
            println!("Updated: {} ({} entries)", archive.display(), ar.len());
        }

        // ── Extract ──────────────────────────────────────────────────────────
        Commands::Extract { archive, output_dir } => {
            let ar = Archive::read_from(&archive)?;
            ar.extract_all(&output_dir)?;
            println!("Extracted {} entries to: {}", ar.len(), output_dir.display());
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Push every file under `inputs`, recursing into directories.
fn add_inputs(ar: &mut Archive, inputs: &[PathBuf], overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    for input in inputs {
        for item in WalkDir::new(input).sort_by_file_name() {
            let item = item?;
            if !item.file_type().is_file() {
                continue;
            }
            let name = entry_name(item.path());
            ar.entries_mut().push_file_as(name.clone(), item.path(), overwrite)?;
            println!("  packed  {name}");
        }
    }
    Ok(())
}

/// Archive name for a filesystem path: its normal components joined by `/`.
fn entry_name(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .ok_or_else(|| format!("expected key=value, got {s:?}"))
}
