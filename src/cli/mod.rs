//! Command-line interface for telofish

use clap::{Parser, Subcommand, ValueEnum};

use crate::data::Cohort;
use crate::reconcile::ReconcileMode;

#[derive(Parser)]
#[command(name = "telofish")]
#[command(version)]
#[command(about = "Longitudinal telomere-length cohort assembly and analysis")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Cohort selector
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum CohortArg {
    Astronaut,
    Control,
}

impl From<CohortArg> for Cohort {
    fn from(arg: CohortArg) -> Self {
        match arg {
            CohortArg::Astronaut => Cohort::Astronaut,
            CohortArg::Control => Cohort::Control,
        }
    }
}

/// Undersized-sample policy
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ModeArg {
    /// Only enforce the size ceiling
    Truncate,
    /// Pad small deficits without replacement
    Rsamp,
    /// Pad small deficits with replacement
    RsampReplace,
    /// Never pad
    Pass,
}

impl From<ModeArg> for ReconcileMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Truncate => ReconcileMode::Truncate,
            ModeArg::Rsamp => ReconcileMode::ResampleWithoutReplacement,
            ModeArg::RsampReplace => ReconcileMode::ResampleWithReplacement,
            ModeArg::Pass => ReconcileMode::PassThrough,
        }
    }
}

/// Shared ingestion/reconciliation options
#[derive(clap::Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Directory of raw measurement exports (.csv/.tsv)
    #[arg(short, long,
        long_help = "Directory of raw measurement exports.\n\
            One file per (subject, timepoint); the file stem must carry the\n\
            subject token and the timepoint, e.g. 'dso5163 mphase TeloFISH L-270.csv'.")]
    pub input: String,

    /// Which cohort the exports belong to
    #[arg(short, long, value_enum, default_value_t = CohortArg::Astronaut,
        long_help = "Which cohort the exports belong to.\n\
            Selects the calibration table and the subject roster; astronaut and\n\
            control tokens are never looked up across cohorts.")]
    pub cohort: CohortArg,

    /// JSON file overriding the built-in calibration rules
    #[arg(long, value_name = "FILE",
        long_help = "JSON file overriding the built-in calibration rules.\n\
            Format: [{\"pattern\": \"5163\", \"divisor\": 59.86}, ...]")]
    pub calibration: Option<String>,

    /// Zero-based measurement column in the export grid [default: 3]
    #[arg(long, default_value = "3")]
    pub column: usize,

    /// Cell count of the reconciliation target [default: 30]
    #[arg(long, default_value = "30")]
    pub cells: usize,

    /// Measurements per cell of the reconciliation target [default: 184]
    #[arg(long, default_value = "184")]
    pub per_cell: usize,

    /// Undersized-sample policy [default: rsamp]
    #[arg(long, value_enum, default_value_t = ModeArg::Rsamp)]
    pub mode: ModeArg,

    /// Resampling seed [default: 28]
    #[arg(long, default_value = "28")]
    pub seed: u64,

    /// Draw from OS entropy instead of the fixed seed
    #[arg(long,
        long_help = "Draw from OS entropy instead of the fixed seed.\n\
            Makes padded/downsampled tables vary run to run; sizes and the\n\
            deterministic cleaning steps are unaffected.")]
    pub unseeded: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Assemble the longitudinal cohort table from a directory of exports
    #[command(
        long_about = "Assemble the longitudinal cohort table.\n\n\
            Extracts and calibrates every export in the input directory,\n\
            classifies each into the canonical schedule, equalizes sample\n\
            sizes, and writes one row per (subject, timepoint) with the mean\n\
            telomere length and quartile counts against the subject's\n\
            pre-flight baseline.",
        after_long_help = "\
Examples:
  telofish assemble -i exports/astros -o astro_cohort.csv
  telofish assemble -i exports/controls -c control --mode pass
  telofish assemble -i exports/astros --unseeded --cells 30 --per-cell 184"
    )]
    Assemble {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Output CSV path [default: cohort_table.csv]
        #[arg(short, long, default_value = "cohort_table.csv")]
        output: String,
    },

    /// Run between-timepoint Mann-Whitney tests for each subject
    #[command(
        long_about = "Run between-timepoint Mann-Whitney tests.\n\n\
            Assembles the cohort, then tests each subject's pre-flight window\n\
            against its mid-flight slots and latest post-flight timepoint\n\
            (pre/post only when mid-flight samples are absent). Results print\n\
            to stdout and can optionally be written as CSV.",
        after_long_help = "\
Examples:
  telofish compare -i exports/astros
  telofish compare -i exports/astros -o astro_tests.csv"
    )]
    Compare {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Optional CSV path for the test results
        #[arg(short, long)]
        output: Option<String>,
    },
}
