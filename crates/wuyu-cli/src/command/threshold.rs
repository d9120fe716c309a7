use anyhow::Context;
use tracing::{info, warn};
use wuyu_stats::binning::CutPoints;
use wuyu_survey::{export::Table, threshold::ThresholdReport};

use crate::util::{DatasetArg, OutputArg, Section};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ThresholdArg {
    #[clap(flatten)]
    dataset: DatasetArg,
    /// Metric field to partition
    #[arg(long)]
    metric: String,
    /// Comma separated cut points, e.g. `-3,-1`
    #[arg(long, allow_hyphen_values = true)]
    cuts: String,
    #[clap(flatten)]
    output: OutputArg,
}

pub(crate) fn run(arg: &ThresholdArg) -> anyhow::Result<()> {
    let ThresholdArg {
        dataset: dataset_arg,
        metric,
        cuts,
        output,
    } = arg;

    let cuts = CutPoints::parse(cuts).with_context(|| format!("Invalid cut points: {cuts}"))?;
    let dataset = dataset_arg.load()?;
    let filters = dataset_arg.filters(&dataset)?;
    let view = dataset.view().filter_all(&filters)?;

    let report = ThresholdReport::new(&view, metric, &cuts)?;
    for notice in &report.notices {
        warn!(metric = %metric, "{notice}");
    }
    info!(
        valid = report.valid_count,
        excluded = report.excluded_count,
        "partitioned metric values"
    );

    let mut sections = vec![Section::new(
        "distribution",
        Table::from_threshold_distribution(&report),
    )];
    if let Some(stats) = &report.stats {
        sections.push(Section::new(
            "statistics",
            Table::from_descriptive_stats(metric, stats),
        ));
    }
    sections.push(Section::new("histogram", Table::from_histogram(&report)));

    output.write(&sections)
}
