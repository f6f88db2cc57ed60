use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::info;
use sleep_report::chart;
use sleep_report::config::ReportConfig;
use sleep_report::report::{resolve_record, ReportExporter};
use sleep_report::session::{Session, SessionFile};
use sleep_report::store::InMemoryRecordStore;
use sleep_report::ReportError;

/// Views and exports the sleep-study report of the logged-in patient.
///
/// The session identity is kept in a small file (see `--session-file`). Without `--records` the
/// two built-in demonstration records are used.
#[derive(Parser)]
#[command(author, version, about = "Sleep-study report viewer and exporter")]
struct Cli {
    /// JSON file with report settings (layout, paper size, file name, chart seed).
    #[arg(long, global = true, env = "SLEEP_REPORT_CONFIG")]
    config: Option<PathBuf>,

    /// JSON array of patient records.
    #[arg(long, global = true, env = "SLEEP_REPORT_RECORDS")]
    records: Option<PathBuf>,

    /// File holding the logged-in identity.
    #[arg(
        long,
        global = true,
        env = "SLEEP_REPORT_SESSION",
        default_value = SessionFile::DEFAULT_FILE_NAME
    )]
    session_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a session for the given email.
    Login {
        email: String,
    },

    /// End the current session.
    Logout,

    /// Print the report as text.
    Show,

    /// Export the report as a PDF named after the configured file name.
    Pdf {
        /// Directory the PDF is written to.
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Add one outline entry per section (requires the `bookmarks` feature).
        #[arg(long)]
        bookmarks: bool,
    },

    /// Export the tabular view with the sleep chart.
    Table {
        #[arg(long, default_value = "Medical_Report_Table.pdf")]
        output: PathBuf,

        /// Seed for the sleep chart.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Render the sleep chart to a PNG file.
    Chart {
        #[arg(long, default_value = "sleep_chart.png")]
        output: PathBuf,

        /// Seed for the sleep chart.
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, default_value_t = 800)]
        width: u32,

        #[arg(long, default_value_t = 300)]
        height: u32,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        if err.requires_login() {
            eprintln!("  hint: run `sleep-report login <EMAIL>` to open a session");
        }
        print_error_sources(&err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), ReportError> {
    let session_file = SessionFile::new(&cli.session_file);
    let mut config = match &cli.config {
        Some(path) => ReportConfig::from_path(path)?,
        None => ReportConfig::default(),
    };

    match cli.command {
        Commands::Login { email } => {
            let session = Session::with_identity(email);
            if session.identity().is_none() {
                return Err(ReportError::MissingIdentity);
            }
            session_file.store(&session)?;
            println!("Logged in as {}", session.identity().unwrap_or_default());
        }
        Commands::Logout => {
            let mut session = session_file.load()?;
            session.logout();
            session_file.store(&session)?;
            println!("Logged out");
        }
        Commands::Show => {
            let store = load_store(cli.records.as_deref())?;
            let session = session_file.load()?;
            let record = resolve_record(&session, &store)?;
            print!("{}", ReportExporter::new(config).export_text(record)?);
        }
        Commands::Pdf {
            output_dir,
            bookmarks,
        } => {
            let store = load_store(cli.records.as_deref())?;
            let session = session_file.load()?;
            let record = resolve_record(&session, &store)?;
            let exporter = ReportExporter::new(config);
            let pdf = if bookmarks {
                export_with_bookmarks(&exporter, record)?
            } else {
                exporter.export_pdf(record)?
            };
            let path = exporter.save(&pdf, &output_dir)?;
            println!(
                "Generated {} ({} pages, {} bytes)",
                path.display(),
                pdf.page_count,
                pdf.bytes.len()
            );
        }
        Commands::Table { output, seed } => {
            let store = load_store(cli.records.as_deref())?;
            let session = session_file.load()?;
            let record = resolve_record(&session, &store)?;
            config.chart_seed = seed.or(config.chart_seed);
            let exporter = ReportExporter::new(config);
            let bytes = exporter.export_table(record, &exporter.chart_series())?;
            fs::write(&output, &bytes)?;
            println!("Generated {} ({} bytes)", output.display(), bytes.len());
        }
        Commands::Chart {
            output,
            seed,
            width,
            height,
        } => {
            config.chart_seed = seed.or(config.chart_seed);
            let series = ReportExporter::new(config).chart_series();
            let bytes = chart::to_png(&series, width, height)?;
            fs::write(&output, &bytes)?;
            info!("chart phases: {:?}", series.iter().map(|point| point.phase).collect::<Vec<_>>());
            println!("Generated {} ({} bytes)", output.display(), bytes.len());
        }
    }

    Ok(())
}

fn load_store(path: Option<&Path>) -> Result<InMemoryRecordStore, ReportError> {
    match path {
        Some(path) => InMemoryRecordStore::from_json_path(path),
        None => Ok(InMemoryRecordStore::builtin()),
    }
}

#[cfg(feature = "bookmarks")]
fn export_with_bookmarks(
    exporter: &ReportExporter,
    record: &sleep_report::record::PatientRecord,
) -> Result<sleep_report::writer::RenderedPdf, ReportError> {
    exporter.export_pdf_with_bookmarks(record)
}

#[cfg(not(feature = "bookmarks"))]
fn export_with_bookmarks(
    _exporter: &ReportExporter,
    _record: &sleep_report::record::PatientRecord,
) -> Result<sleep_report::writer::RenderedPdf, ReportError> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "Enable the `bookmarks` feature to export bookmarked PDFs",
    )
    .into())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
