use std::path::PathBuf;

use wuyu_survey::{encoder::Encoder, export::Table};

use crate::util::{self, CatalogArg, OutputArg, Section};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CodebookArg {
    #[clap(flatten)]
    catalog: CatalogArg,
    /// Survey responses; adds the ordinal code tables observed in them
    #[arg(long)]
    input: Option<PathBuf>,
    #[clap(flatten)]
    output: OutputArg,
}

pub(crate) fn run(arg: &CodebookArg) -> anyhow::Result<()> {
    let CodebookArg {
        catalog,
        input,
        output,
    } = arg;

    let catalog = catalog.load()?;
    let mut sections = vec![
        Section::new("fields", Table::from_rename_map(&catalog)),
        Section::new("fixed_scales", Table::from_fixed_scales(&catalog)),
        Section::new("regions", Table::from_region_table()),
    ];

    if let Some(input) = input {
        let raw = util::read_csv_file(input)?;
        let dataset = Encoder::new(&catalog).encode(&raw)?;
        sections.extend(
            dataset
                .encodings()
                .iter()
                .map(|(field, encoding)| Section::new(field.as_str(), Table::from_encoding(encoding))),
        );
    }

    output.write(&sections)
}
