use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info_span;
use tracing_subscriber::EnvFilter;

use bibfmt::{config, Database, Error, Mode, Name, NameFormatter};

/// Format and check BibTeX bibliographies.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Repair malformed names instead of failing on them.
    #[arg(long, global = true)]
    lenient: bool,

    /// TOML file with special-name overrides.
    #[arg(long, value_name = "FILE", default_value = "bibfmt.toml", global = true)]
    config: PathBuf,

    /// Log repaired and skipped names.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether the bibliography files are canonically formatted.
    Check {
        #[arg(value_name = "FILE", default_values = ["krr.bib", "procs.bib"])]
        files: Vec<PathBuf>,
    },
    /// Rewrite bibliography files in canonical form.
    Format {
        #[arg(value_name = "FILE", default_values = ["krr.bib", "procs.bib"])]
        files: Vec<PathBuf>,
    },
    /// Abbreviate author and editor names across the bibliography files.
    FormatNames {
        #[arg(value_name = "FILE", default_values = ["krr.bib", "procs.bib"])]
        files: Vec<PathBuf>,
    },
    /// Split names into their parts and print them as JSON.
    Parse {
        #[arg(value_name = "NAME", required = true)]
        names: Vec<String>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "bibfmt=debug"
    } else {
        "bibfmt=warn"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode, Error> {
    let mode = if args.lenient {
        Mode::Lenient
    } else {
        Mode::Strict
    };

    match args.command {
        Command::Check { files } => check(&files),
        Command::Format { files } => format(&files),
        Command::FormatNames { files } => format_names(&files, &args.config, mode),
        Command::Parse { names } => parse(&names, mode),
    }
}

fn check(files: &[PathBuf]) -> Result<ExitCode, Error> {
    let mut diff = Vec::new();
    for path in files {
        let _span = info_span!("check", file = %path.display()).entered();
        let input = read(path)?;
        let mut db = Database::parse(&input);
        db.cleanup();
        diff.extend(diff_lines(&input, &db.to_bibtex(true)));
    }

    if diff.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        for line in &diff {
            eprintln!("{line}");
        }
        Ok(ExitCode::FAILURE)
    }
}

fn format(files: &[PathBuf]) -> Result<ExitCode, Error> {
    for path in files {
        let _span = info_span!("format", file = %path.display()).entered();
        let mut db = Database::parse(&read(path)?);
        db.cleanup();
        write(path, db.to_bibtex(true))?;
    }
    Ok(ExitCode::SUCCESS)
}

fn format_names(files: &[PathBuf], config_path: &Path, mode: Mode) -> Result<ExitCode, Error> {
    let mut dbs = Vec::new();
    for path in files {
        let mut db = Database::parse(&read(path)?);
        db.cleanup();
        dbs.push(db);
    }

    // Names already present anywhere in the bibliography guide how new
    // occurrences are split.
    let mut formatter = NameFormatter::new(config::load(config_path)?, mode);
    for db in &dbs {
        formatter.learn(db);
    }

    for (db, path) in dbs.iter_mut().zip(files) {
        let _span = info_span!("format-names", file = %path.display()).entered();
        formatter.format_database(db);
        write(path, db.to_bibtex(false))?;
    }
    Ok(ExitCode::SUCCESS)
}

fn parse(names: &[String], mode: Mode) -> Result<ExitCode, Error> {
    for raw in names {
        let name = match mode {
            Mode::Strict => Name::parse(raw)?,
            Mode::Lenient => Name::parse_lenient(raw),
        };
        println!("{}", serde_json::to_string(&name)?);
    }
    Ok(ExitCode::SUCCESS)
}

fn read(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, text: String) -> Result<(), Error> {
    fs::write(path, text).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Line diff against the canonical form: lines outside the common prefix
/// and suffix are reported, input lines with `-` and expected with `+`.
fn diff_lines(old: &str, new: &str) -> Vec<String> {
    let old: Vec<&str> = old.lines().collect();
    let new: Vec<&str> = new.lines().collect();

    let mut start = 0;
    while start < old.len() && start < new.len() && old[start] == new[start] {
        start += 1;
    }
    let mut old_end = old.len();
    let mut new_end = new.len();
    while old_end > start && new_end > start && old[old_end - 1] == new[new_end - 1] {
        old_end -= 1;
        new_end -= 1;
    }

    let mut lines = Vec::new();
    for line in &old[start..old_end] {
        lines.push(format!("- {line}"));
    }
    for line in &new[start..new_end] {
        lines.push(format!("+ {line}"));
    }
    lines
}
