//! telofish command-line interface

use clap::Parser;
use log::{info, LevelFilter};

use telofish::cli::{Cli, Commands, PipelineArgs};
use telofish::prelude::*;

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Commands::Assemble { pipeline, output } => run_assemble(&pipeline, &output),
        Commands::Compare { pipeline, output } => run_compare(&pipeline, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn build_records(args: &PipelineArgs) -> Result<Vec<LongitudinalRecord>> {
    let cohort: Cohort = args.cohort.into();

    let registry = match &args.calibration {
        Some(path) => CalibrationRegistry::from_json_file(cohort, path)?,
        None => CalibrationRegistry::for_cohort(cohort),
    };

    let options = LoadOptions {
        column: args.column,
        template: ExtractionTemplate::default(),
    };
    let samples = load_cohort_dir(&args.input, &registry, &options)?;
    info!("extracted {} sample(s) from {}", samples.len(), args.input);

    let config = AssemblyConfig {
        cells: args.cells,
        measurements_per_cell: args.per_cell,
        mode: args.mode.into(),
        seed: if args.unseeded { None } else { Some(args.seed) },
    };
    assemble(&samples, &SubjectRoster::for_cohort(cohort), &config)
}

fn run_assemble(args: &PipelineArgs, output: &str) -> Result<()> {
    let records = build_records(args)?;
    write_cohort_table(output, &records)?;
    info!("wrote {} record(s) to {}", records.len(), output);
    Ok(())
}

fn run_compare(args: &PipelineArgs, output: Option<&str>) -> Result<()> {
    let records = build_records(args)?;
    let by_subject = compare_by_subject(&records);

    if by_subject.is_empty() {
        info!("no subject has a testable pre/post window pair");
        return Ok(());
    }

    for subject in &by_subject {
        for c in &subject.comparisons {
            println!(
                "{}  compared vs  {}: U = {:.1}, p = {:.4e}",
                c.left, c.right, c.test.u, c.test.p_value
            );
        }
    }

    if let Some(path) = output {
        write_comparisons(path, &by_subject)?;
        info!("wrote test results to {}", path);
    }

    Ok(())
}
