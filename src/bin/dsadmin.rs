use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use datasource_admin::app::App;
use datasource_admin::citation::EuropePmcClient;
use datasource_admin::config::{ConfigLoader, ResolvedConfig};
use datasource_admin::domain::{Availability, DatasourceType, RecordEdit};
use datasource_admin::error::AdminError;
use datasource_admin::output::{JsonOutput, OutputMode, TextOutput};
use datasource_admin::server::HttpDatasourceServer;

#[derive(Parser)]
#[command(name = "dsadmin")]
#[command(about = "Manage datasource metadata records on a pathway data warehouse server")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<String>,

    #[arg(long, global = true)]
    base_url: Option<String>,

    #[arg(long, global = true)]
    non_interactive: bool,

    #[arg(long, global = true)]
    no_citations: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "List datasources with their citations")]
    List,
    #[command(about = "Check that an identifier is not taken yet")]
    Check(IdentifierArgs),
    #[command(about = "Create a new datasource")]
    New(IdentifierArgs),
    #[command(about = "Edit fields of a datasource and save it")]
    Save(SaveArgs),
    #[command(about = "Delete a datasource")]
    Delete(IdentifierArgs),
    #[command(about = "Upload a data file for a datasource")]
    Upload(UploadArgs),
}

#[derive(Args)]
struct IdentifierArgs {
    identifier: String,
}

#[derive(Args)]
struct SaveArgs {
    identifier: String,

    #[arg(long = "name")]
    names: Vec<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long = "type", value_enum)]
    data_type: Option<DatasourceType>,

    #[arg(long, value_enum)]
    availability: Option<Availability>,

    #[arg(long)]
    pubmed_id: Option<String>,

    #[arg(long)]
    icon_url: Option<String>,

    #[arg(long)]
    url_to_data: Option<String>,

    #[arg(long)]
    url_to_homepage: Option<String>,

    #[arg(long)]
    cleaner: Option<String>,

    #[arg(long)]
    converter: Option<String>,
}

impl SaveArgs {
    fn edit(&self) -> RecordEdit {
        RecordEdit {
            name: (!self.names.is_empty()).then(|| self.names.clone()),
            description: self.description.clone(),
            icon_url: self.icon_url.clone(),
            url_to_data: self.url_to_data.clone(),
            url_to_homepage: self.url_to_homepage.clone(),
            cleaner_classname: self.cleaner.clone(),
            converter_classname: self.converter.clone(),
            data_type: self.data_type,
            availability: self.availability,
            pubmed_id: self.pubmed_id.clone(),
        }
    }
}

#[derive(Args)]
struct UploadArgs {
    identifier: String,
    file: String,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<AdminError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &AdminError) -> u8 {
    match error {
        error if error.is_validation() => 2,
        AdminError::MissingConfig(_)
        | AdminError::ConfigRead(_)
        | AdminError::ConfigParse(_)
        | AdminError::InvalidUrl { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let mut config = ConfigLoader::resolve(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url)?;
    }
    let listing = matches!(cli.command, Command::List);
    let wants_citations = listing && config.citations && !cli.no_citations;

    let server = HttpDatasourceServer::new(&config)?;
    let citations = citation_client(&config, wants_citations)?;
    let mut app = App::new(server, citations);
    if !listing {
        app.load();
    }

    match cli.command {
        Command::List => {
            let result = app.list();
            emit(&result, output_mode, TextOutput::print_list)
        }
        Command::Check(args) => {
            let result = app.check(&args.identifier);
            emit(&result, output_mode, TextOutput::print_check)
        }
        Command::New(args) => {
            let report = app.create(&args.identifier)?;
            emit(&report, output_mode, TextOutput::print_save)
        }
        Command::Save(args) => {
            let edit = args.edit();
            let report = if edit.is_empty() {
                app.save(&args.identifier)?
            } else {
                app.edit(&args.identifier, &edit)?
            };
            emit(&report, output_mode, TextOutput::print_save)
        }
        Command::Delete(args) => {
            let result = app.delete(&args.identifier)?;
            emit(&result, output_mode, TextOutput::print_delete)
        }
        Command::Upload(args) => {
            app.stage_file(&args.identifier, args.file.as_str())?;
            let report = app.upload(&args.identifier)?;
            emit(&report, output_mode, TextOutput::print_upload)
        }
    }
}

fn citation_client(
    config: &ResolvedConfig,
    enabled: bool,
) -> Result<Option<EuropePmcClient>, AdminError> {
    if enabled {
        EuropePmcClient::new(config).map(Some)
    } else {
        Ok(None)
    }
}

fn emit<T: Serialize>(
    value: &T,
    output_mode: OutputMode,
    text: fn(&T) -> std::io::Result<()>,
) -> miette::Result<()> {
    let printed = match output_mode {
        OutputMode::NonInteractive => JsonOutput::print(value),
        OutputMode::Interactive => text(value),
    };
    printed.into_diagnostic()
}
