use std::{fs, path::PathBuf};

use anyhow::Context;
use tracing::info;
use wuyu_survey::export::Table;

use crate::util::{self, DatasetArg, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EncodeArg {
    #[clap(flatten)]
    dataset: DatasetArg,
    /// Directory receiving `encoded.csv`, one `mapping_<field>.csv` per
    /// ordinal field and `coercion.json`
    #[arg(long)]
    output_dir: PathBuf,
}

pub(crate) fn run(arg: &EncodeArg) -> anyhow::Result<()> {
    let EncodeArg {
        dataset: dataset_arg,
        output_dir,
    } = arg;

    let dataset = dataset_arg.load()?;
    let filters = dataset_arg.filters(&dataset)?;
    let view = dataset.view().filter_all(&filters)?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let encoded_path = output_dir.join("encoded.csv");
    util::write_csv_file(&encoded_path, &Table::from_view(&view))?;
    info!(records = view.len(), path = %encoded_path.display(), "wrote encoded dataset");

    for (field, encoding) in dataset.encodings() {
        let path = output_dir.join(format!("mapping_{field}.csv"));
        util::write_csv_file(&path, &Table::from_encoding(encoding))?;
        info!(field = %field, codes = encoding.len(), path = %path.display(), "wrote mapping table");
    }

    let mut output = Output::open(output_dir.join("coercion.json"))?;
    output.write_json(dataset.coercion())?;
    Ok(())
}
