use anyhow::Context;
use tracing::{info, warn};
use wuyu_stats::binning::CutPoints;
use wuyu_survey::{
    contingency::{Category, CompositeGroups, ContingencyRequest, ContingencyTable},
    export::{ContingencyLayout, Table},
};

use crate::util::{DatasetArg, KeyValues, OutputArg, Section};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CrosstabArg {
    #[clap(flatten)]
    dataset: DatasetArg,
    /// Metric field partitioned into the columns
    #[arg(long)]
    metric: String,
    /// Field whose values form the rows
    #[arg(long)]
    group_by: String,
    /// Comma separated cut points, e.g. `-3,-1`
    #[arg(long, allow_hyphen_values = true)]
    cuts: String,
    /// Plain categories to show as rows
    #[arg(long = "category", value_delimiter = ',')]
    categories: Vec<String>,
    /// Composite category summing its members (NAME=v1,v2); repeatable
    #[arg(long = "group", value_name = "NAME=VALUES")]
    groups: Vec<KeyValues>,
    /// Omit the totals row and column
    #[arg(long)]
    no_totals: bool,
    /// Apply Yates' continuity correction to 2x2 tables
    #[arg(long)]
    yates: bool,
    #[clap(flatten)]
    output: OutputArg,
}

pub(crate) fn run(arg: &CrosstabArg) -> anyhow::Result<()> {
    let CrosstabArg {
        dataset: dataset_arg,
        metric,
        group_by,
        cuts,
        categories,
        groups,
        no_totals,
        yates,
        output,
    } = arg;

    let cuts = CutPoints::parse(cuts).with_context(|| format!("Invalid cut points: {cuts}"))?;
    let dataset = dataset_arg.load()?;
    let filters = dataset_arg.filters(&dataset)?;
    let view = dataset.view().filter_all(&filters)?;

    let plain = categories
        .iter()
        .map(|text| dataset.resolve_value(group_by, text))
        .collect::<Result<Vec<_>, _>>()?;
    let mut composite = CompositeGroups::new();
    for group in groups {
        let members = group
            .values
            .iter()
            .map(|text| dataset.resolve_value(group_by, text))
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Invalid members of group '{}'", group.key))?;
        composite.define_group(group.key.as_str(), members);
    }
    let categories = Category::select(&plain, &composite);

    let request = ContingencyRequest::new(metric, group_by, &cuts, &categories)
        .with_continuity_correction(*yates);
    let table = ContingencyTable::build(&view, &request)?;
    for notice in &table.notices {
        warn!(metric = %metric, "{notice}");
    }
    info!(
        rows = table.rows.len(),
        total = table.grand_total,
        "{}",
        table.chi_square.summary()
    );

    let layout = ContingencyLayout {
        totals: !no_totals,
        chi_square_row: true,
    };
    let mut sections = vec![Section::new(
        "contingency",
        Table::from_contingency(&table, layout),
    )];
    if let Some(stats) = &table.stats {
        sections.push(Section::new(
            "statistics",
            Table::from_descriptive_stats(metric, stats),
        ));
    }

    output.write(&sections)
}
