//! CLI entry point for `pgseqcheck`.

use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use pgseqcheck::config::Settings;
use pgseqcheck::connect::{self, Credentials, CredentialsProvider, TermPrompt};
use pgseqcheck::report::RepeatReport;
use pgseqcheck::scan::{repeats, sequences};

#[derive(Parser)]
#[command(
    name = "pgseqcheck",
    about = "Find PostgreSQL sequences reused as the default of more than one column"
)]
struct Cli {
    /// Schema to scan for reused sequences
    schema: String,

    /// JSON settings file, or a directory containing config.json
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print scan diagnostics to stderr
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let (credentials, sslmode) = match acquire_credentials(cli.config.as_deref()) {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("{e}");
            process::exit(2);
        }
    };

    let mut conn = match connect::establish(&credentials, &sslmode) {
        Ok(conn) => conn,
        Err(e) => {
            eprintln!("{e}");
            process::exit(2);
        }
    };

    let bindings = match sequences::find_sequence_columns(&mut conn, &cli.schema) {
        Ok(bindings) => bindings,
        Err(e) => {
            eprintln!("{e}");
            process::exit(2);
        }
    };
    if cli.verbose {
        eprintln!(
            "Found {} sequence-backed columns in schema '{}'",
            bindings.len(),
            cli.schema
        );
    }

    let mut report = RepeatReport::new();
    for probe in &bindings {
        match repeats::find_repeats(&mut conn, probe, &cli.schema) {
            Ok(group) => {
                if cli.verbose && !group.is_empty() {
                    eprintln!(
                        "{}.{}: default shared by {} columns",
                        probe.table_name,
                        probe.column_name,
                        group.len()
                    );
                }
                report.extend(group);
            }
            Err(e) => {
                eprintln!("{e}");
                process::exit(2);
            }
        }
    }

    println!("{}", report.render_for_schema(&cli.schema));

    // Reused sequences are a finding, reported through the exit code as well.
    if !report.is_empty() {
        process::exit(1);
    }
}

fn acquire_credentials(config: Option<&Path>) -> Result<(Credentials, String), String> {
    match config {
        Some(path) => {
            let settings = Settings::load(path)?;
            Ok(settings.postgres.into_connection_parts())
        }
        None => {
            let mut prompt = TermPrompt::new(io::stdin().lock(), io::stderr());
            let credentials = prompt.provide()?;
            Ok((credentials, "disable".to_string()))
        }
    }
}
