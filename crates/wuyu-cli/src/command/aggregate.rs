use tracing::{error, warn};
use wuyu_survey::{aggregate::aggregate, export::Table};

use crate::util::{DatasetArg, OutputArg, Section};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AggregateArg {
    #[clap(flatten)]
    dataset: DatasetArg,
    /// Field whose distinct values form the groups
    #[arg(long)]
    group_by: String,
    /// Metric fields to average (every metric field when omitted)
    #[arg(long, value_delimiter = ',')]
    metrics: Vec<String>,
    #[clap(flatten)]
    output: OutputArg,
}

pub(crate) fn run(arg: &AggregateArg) -> anyhow::Result<()> {
    let AggregateArg {
        dataset: dataset_arg,
        group_by,
        metrics,
        output,
    } = arg;

    let dataset = dataset_arg.load()?;
    let filters = dataset_arg.filters(&dataset)?;
    let view = dataset.view().filter_all(&filters)?;

    let metrics = if metrics.is_empty() {
        dataset.metric_fields()
    } else {
        metrics.as_slice()
    };

    let mut sections = vec![];
    for metric in metrics {
        let aggregation = match aggregate(&view, metric, group_by) {
            Ok(aggregation) => aggregation,
            Err(e) => {
                error!(metric = %metric, "aggregation failed: {e}");
                continue;
            }
        };
        for notice in &aggregation.notices {
            warn!(metric = %metric, "{notice}");
        }
        sections.push(Section::new(
            metric.as_str(),
            Table::from_aggregation(&aggregation),
        ));
    }

    output.write(&sections)
}
