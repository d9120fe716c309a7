use clap::{Parser, Subcommand};

use crate::util;

use self::{
    aggregate::AggregateArg, codebook::CodebookArg, crosstab::CrosstabArg, encode::EncodeArg,
    threshold::ThresholdArg,
};

mod aggregate;
mod codebook;
mod crosstab;
mod encode;
mod threshold;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log debug events (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
    /// What to do with the survey responses
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Encode responses and write the dataset with its mapping tables
    Encode(#[clap(flatten)] EncodeArg),
    /// Mean of metrics per group
    Aggregate(#[clap(flatten)] AggregateArg),
    /// Interval shares, descriptive statistics and histogram of one metric
    Threshold(#[clap(flatten)] ThresholdArg),
    /// Contingency table of metric intervals by categories with a chi-square test
    Crosstab(#[clap(flatten)] CrosstabArg),
    /// Field catalog, fixed scales and region lookup tables
    Codebook(#[clap(flatten)] CodebookArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    util::init_tracing(args.verbose);
    match args.mode {
        Mode::Encode(arg) => encode::run(&arg)?,
        Mode::Aggregate(arg) => aggregate::run(&arg)?,
        Mode::Threshold(arg) => threshold::run(&arg)?,
        Mode::Crosstab(arg) => crosstab::run(&arg)?,
        Mode::Codebook(arg) => codebook::run(&arg)?,
    }
    Ok(())
}
