//! Purpose: `litedump` CLI entry point.
//! Role: Binary crate root; parses args, bootstraps tracing, runs the
//! batch driver from `litedump::core`.
//! Invariants: Diagnostics are leveled tracing events on stderr; stdout
//! carries only summary lines and completion scripts.
//! Invariants: Process exit code is derived from `to_exit_code`.
use std::io;
use std::path::PathBuf;

use clap::{ArgGroup, CommandFactory, Parser, ValueHint};
use clap_complete::aot::Shell;
use tracing_subscriber::EnvFilter;

use litedump::{Error, ErrorKind, export_dir, export_file, to_exit_code};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

#[derive(Parser)]
#[command(
    name = "litedump",
    version,
    about = "Convert SQLite database files to JSON Lines, one file per table",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Each table of each database becomes one .jsonl file under the output
directory, nested by the input file's path. A pending write-ahead log is
folded into the database first (with a transient .backup safety copy)."#,
    after_help = r#"EXAMPLES
  $ litedump -f app.db                       # export to ./output/app.db/
  $ litedump -f app.db -o /tmp/dump
  $ litedump -d ./databases                  # every SQLite file in the folder
  $ litedump --completions zsh > _litedump

NOTES
  - Databases are recognized by the 16-byte SQLite header; other files
    in a folder are skipped with a diagnostic.
  - Folding the log rewrites the database in place. Keep other writers
    away while an export runs.
  - Set RUST_LOG=debug for per-table detail."#,
    group(
        ArgGroup::new("input")
            .args(["input_filename", "input_foldername"])
            .multiple(false)
    )
)]
struct Cli {
    #[arg(
        short = 'o',
        long = "output_dir",
        help = "Output directory (default: ./output)",
        value_hint = ValueHint::DirPath
    )]
    output_dir: Option<PathBuf>,
    #[arg(
        short = 'f',
        long = "input_filename",
        help = "One SQLite database file to export",
        value_hint = ValueHint::FilePath
    )]
    input_filename: Option<PathBuf>,
    #[arg(
        short = 'd',
        long = "input_foldername",
        help = "Folder whose SQLite files are exported (non-recursive)",
        value_hint = ValueHint::DirPath
    )]
    input_foldername: Option<PathBuf>,
    #[arg(long, value_enum, help = "Print a shell completion script and exit")]
    completions: Option<Shell>,
}

fn run() -> Result<RunOutcome, Error> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::aot::generate(shell, &mut cmd, "litedump", &mut io::stdout());
        return Ok(RunOutcome::ok());
    }

    let output_dir = cli.output_dir.unwrap_or_else(|| PathBuf::from("output"));

    match (cli.input_filename, cli.input_foldername) {
        (Some(file), None) => {
            let summary = export_file(&file, &output_dir, false)?;
            println!(
                "Exported {} tables ({} rows, {} failed) from {} to {}",
                summary.tables,
                summary.rows,
                summary.failed_tables,
                file.display(),
                output_dir.display()
            );
            Ok(RunOutcome::ok())
        }
        (None, Some(dir)) => {
            let summary = export_dir(&dir, &output_dir)?;
            println!(
                "Exported {} files ({} skipped, {} failed) from {} to {}",
                summary.files,
                summary.skipped,
                summary.failed,
                dir.display(),
                output_dir.display()
            );
            Ok(RunOutcome::ok())
        }
        _ => Err(Error::new(ErrorKind::Usage)
            .with_message("an input is required")
            .with_hint("Pass -f/--input_filename or -d/--input_foldername.")),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn emit_error(err: &Error) {
    tracing::error!("{err}");
    if let Some(hint) = err.hint() {
        tracing::info!("hint: {hint}");
    }
}
