use anyhow::Context;
use anyhow::Result;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use rusty_config::generator::Language;
use rusty_config::pipeline::write_data_files;
use rusty_config::table::converter::ValueConverter;
use rusty_config::Config;
use rusty_config::Pipeline;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Converts spreadsheet configuration tables into data classes and JSON data files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate data classes
    Code(Options),
    /// Generate `.num` data files
    Data(Options),
    /// Generate data classes and data files
    All(Options),
}

/// Settings shared by every subcommand; each overrides the settings file
#[derive(Args, Debug)]
struct Options {
    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the workbooks
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory of the generated code
    #[arg(long)]
    code_out: Option<PathBuf>,

    /// Output directory of the data files
    #[arg(long)]
    data_out: Option<PathBuf>,

    /// Namespace (C#) or package (Go) of the generated code
    #[arg(short, long)]
    namespace: Option<String>,

    /// Target language, repeatable
    #[arg(short, long, value_enum, value_delimiter = ',')]
    language: Vec<Language>,

    /// Reserved id field name
    #[arg(long)]
    id_field: Option<String>,

    /// Glob of the workbook file names
    #[arg(short, long)]
    pattern: Option<String>,
}

impl Options {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(input) = self.input {
            config.excel_path = input;
        }
        if let Some(code_out) = self.code_out {
            config.code_output_path = code_out;
        }
        if let Some(data_out) = self.data_out {
            config.data_output_path = data_out;
        }
        if let Some(namespace) = self.namespace {
            config.code_namespace = namespace;
        }
        if !self.language.is_empty() {
            config.languages = self.language;
        }
        if let Some(id_field) = self.id_field {
            config.id_field = id_field;
        }
        if let Some(pattern) = self.pattern {
            config.pattern = pattern;
        }
        let current_dir = std::env::current_dir().context("Failed to read the current directory")?;
        config.resolve_paths(&current_dir);
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.verbose {
        EnvFilter::new("rusty_config=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rusty_config=info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let (options, code, data) = match cli.command {
        Commands::Code(options) => (options, true, false),
        Commands::Data(options) => (options, false, true),
        Commands::All(options) => (options, true, true),
    };
    let config = options.into_config()?;
    let pipeline = Pipeline::new(ValueConverter::with_defaults(), &config.id_field);

    let tables = pipeline
        .process_directory(&config.excel_path, &config.pattern)
        .context("Failed to read workbooks")?;
    if code {
        let files = pipeline
            .write_code(&tables.schemas, &config.languages, &config.code_namespace, &config.code_output_path)
            .context("Failed to generate code")?;
        info!(files = files.len(), output = %config.code_output_path.display(), "Code generation finished");
    }
    if data {
        let files = write_data_files(&config.data_output_path, &tables.data).context("Failed to generate data")?;
        info!(files = files.len(), output = %config.data_output_path.display(), "Data generation finished");
    }
    Ok(())
}
