use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{LevelFilter, error};
use relsync::{
    analysis::{AnalysisResults, Diagnostic},
    code_model::ManifestCodeModel,
    config::Config,
    orchestrator::{GenerationReport, RelsyncOrchestrator},
};

#[derive(Parser, Debug)]
#[command(name = "relsync", version, about)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file applied after user and project files
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print relationships, cycles and diagnostics of an entity manifest
    Analyze {
        /// TOML entity manifest
        manifest: PathBuf,
    },
    /// Write one relationship fragment per entity
    Generate {
        /// TOML entity manifest
        manifest: PathBuf,

        /// Output directory for generated Java files
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

/// Returns `Ok(false)` when error diagnostics were reported
fn run(cli: &Cli) -> Result<bool> {
    let config = Config::load(cli.config.as_deref())?;
    let orchestrator = RelsyncOrchestrator::new(config);

    match &cli.command {
        Command::Analyze { manifest } => {
            let model = ManifestCodeModel::load(manifest)?;
            let analysis = orchestrator.analyze(&model)?;
            print_analysis(&analysis)?;
            Ok(!analysis.diagnostics.has_errors())
        }
        Command::Generate { manifest, output } => {
            let model = ManifestCodeModel::load(manifest)?;
            let report = orchestrator.generate(&model)?;
            let written = orchestrator.write(&report.output, output)?;
            print_generation(&report, &written, output)?;
            Ok(!report.has_errors())
        }
    }
}

fn print_analysis(analysis: &AnalysisResults) -> Result<()> {
    let mut stdout = io::stdout().lock();

    writeln!(stdout, "Relationships:")?;
    for relationship in &analysis.relationships {
        let cascade: Vec<&str> = relationship
            .cascade_types
            .iter()
            .map(|cascade| cascade.as_str())
            .collect();
        let pairing = relationship
            .inverse_field_name
            .as_deref()
            .map_or_else(|| "unidirectional".to_owned(), |inverse| format!("inverse {inverse}"));
        writeln!(
            stdout,
            "  {} [{}{}; cascade {{{}}}; fetch {:?}]",
            relationship.key(),
            pairing,
            if relationship.is_circular { "; circular" } else { "" },
            cascade.join(", "),
            relationship.fetch_type
        )?;
    }

    writeln!(stdout, "Cycles: {}", analysis.cycles.len())?;
    for cycle in &analysis.cycles {
        writeln!(stdout, "  {}", cycle.describe())?;
    }

    print_diagnostics(&mut stdout, analysis.diagnostics.iter())
}

fn print_generation(report: &GenerationReport, written: &[PathBuf], output: &Path) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "Generated {} files in {}",
        written.len(),
        output.display()
    )?;
    print_diagnostics(
        &mut stdout,
        report
            .analysis
            .diagnostics
            .iter()
            .chain(report.output.diagnostics.iter()),
    )
}

fn print_diagnostics<'a>(
    out: &mut impl Write,
    diagnostics: impl Iterator<Item = &'a Diagnostic>,
) -> Result<()> {
    let diagnostics: Vec<_> = diagnostics.collect();
    if diagnostics.is_empty() {
        return Ok(());
    }
    writeln!(out, "Diagnostics:")?;
    for diagnostic in diagnostics {
        writeln!(out, "  {diagnostic}")?;
    }
    Ok(())
}
