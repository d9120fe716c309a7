use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use wuyu_survey::{
    catalog::{FieldCatalog, builtin::shanghainese_survey},
    dataset::{Dataset, Filter},
    encoder::Encoder,
    export::Table,
    record::RawTable,
};

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `--verbose` selects `debug` over the
/// default `info`.
pub(crate) fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }

    pub fn write_csv(&mut self, table: &Table) -> anyhow::Result<()> {
        let display_path = self.display_path();
        let mut writer = csv::Writer::from_writer(&mut *self);
        writer
            .write_record(&table.header)
            .with_context(|| format!("Failed to write CSV header to {display_path}"))?;
        for row in &table.rows {
            writer
                .write_record(row)
                .with_context(|| format!("Failed to write CSV row to {display_path}"))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush output to {display_path}"))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Comma separated values, one block per table
    #[default]
    Csv,
    /// Pretty-printed JSON array of tables
    Json,
}

#[derive(Debug, Clone, Default, clap::Args)]
pub(crate) struct OutputArg {
    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

/// A titled table of a command's report.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Section {
    pub title: String,
    #[serde(flatten)]
    pub table: Table,
}

impl Section {
    pub fn new(title: impl Into<String>, table: Table) -> Self {
        Self {
            title: title.into(),
            table,
        }
    }
}

impl OutputArg {
    /// Writes `sections` in the selected format.
    ///
    /// CSV output separates tables with a blank line and a `# title` line.
    pub fn write(&self, sections: &[Section]) -> anyhow::Result<()> {
        let mut output = Output::from_output_path(self.output.clone())?;
        match self.format {
            OutputFormat::Json => output.write_json(sections)?,
            OutputFormat::Csv => {
                for (idx, section) in sections.iter().enumerate() {
                    if idx > 0 {
                        writeln!(output)?;
                    }
                    if sections.len() > 1 {
                        writeln!(output, "# {}", section.title)?;
                    }
                    output.write_csv(&section.table)?;
                }
            }
        }
        debug!(tables = sections.len(), output = %output.display_path(), "wrote report");
        Ok(())
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read survey responses from a CSV file with a header row
///
/// Rows may be shorter or longer than the header; missing cells are treated
/// as blank answers.
///
/// # Errors
///
/// Returns error if the file cannot be opened or is not valid UTF-8 CSV
pub fn read_csv_file<P>(path: P) -> anyhow::Result<RawTable>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open survey file: {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read CSV header: {}", path.display()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_owned())
        .collect::<Vec<_>>();

    let rows = reader
        .records()
        .map(|record| {
            record
                .map(|record| record.iter().map(str::to_owned).collect::<Vec<_>>())
                .with_context(|| format!("Failed to parse CSV record in {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(RawTable::from_rows(headers, rows))
}

pub fn write_csv_file<P>(path: P, table: &Table) -> anyhow::Result<()>
where
    P: AsRef<Path>,
{
    let mut output = Output::open(path.as_ref().to_path_buf())?;
    output.write_csv(table)
}

/// `NAME=v1,v2,...` command line value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeyValues {
    pub key: String,
    pub values: Vec<String>,
}

impl FromStr for KeyValues {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, values) = s
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=VALUE[,VALUE...], got '{s}'"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("missing name before '=' in '{s}'"));
        }
        let values = values
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
            .collect();
        Ok(Self {
            key: key.to_owned(),
            values,
        })
    }
}

#[derive(Debug, Clone, Default, clap::Args)]
pub(crate) struct CatalogArg {
    /// Field catalog JSON file (the built-in questionnaire catalog when omitted)
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Keep respondents rejected by the catalog pre-filter
    #[arg(long)]
    keep_all_responses: bool,
}

impl CatalogArg {
    pub fn load(&self) -> anyhow::Result<FieldCatalog> {
        let catalog = match &self.catalog {
            Some(path) => {
                let config = read_json_file("catalog", path)?;
                FieldCatalog::new(config)
                    .with_context(|| format!("Invalid field catalog: {}", path.display()))?
            }
            None => shanghainese_survey(),
        };
        if self.keep_all_responses {
            Ok(catalog.without_prefilter())
        } else {
            Ok(catalog)
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DatasetArg {
    /// Survey responses (CSV with a header row)
    input: PathBuf,
    #[clap(flatten)]
    catalog: CatalogArg,
    /// Keep records whose FIELD is one of the values; repeatable
    #[arg(long = "filter", value_name = "FIELD=VALUES")]
    filters: Vec<KeyValues>,
}

impl DatasetArg {
    pub fn load(&self) -> anyhow::Result<Dataset> {
        let catalog = self.catalog.load()?;
        let raw = read_csv_file(&self.input)?;
        info!(
            path = %self.input.display(),
            responses = raw.records.len(),
            "loaded survey responses"
        );
        let dataset = Encoder::new(&catalog)
            .encode(&raw)
            .with_context(|| format!("Failed to encode {}", self.input.display()))?;
        info!(
            records = dataset.len(),
            metrics = dataset.metric_fields().len(),
            "encoded dataset"
        );
        Ok(dataset)
    }

    /// Filters with their values resolved against `dataset`.
    pub fn filters(&self, dataset: &Dataset) -> anyhow::Result<Vec<Filter>> {
        self.filters
            .iter()
            .map(|kv| {
                let allowed = kv
                    .values
                    .iter()
                    .map(|text| dataset.resolve_value(&kv.key, text))
                    .collect::<Result<Vec<_>, _>>()
                    .with_context(|| format!("Invalid filter on '{}'", kv.key))?;
                Ok(Filter {
                    field: kv.key.clone(),
                    allowed,
                })
            })
            .collect()
    }
}
