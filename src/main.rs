use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::{debug, error};

use reportmd::report::{self, ReportSource};
use reportmd::{AgentConfig, ProcessingAgent};

#[derive(Parser)]
#[command(name = "reportmd", about = "Render JSON report data as markdown")]
#[command(version, propagate_version = true)]
struct Cli
{   #[command(subcommand)]
    command: Commands

  , /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool

  , /// Agent config file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>
}

#[derive(Subcommand)]
enum Commands
{   /// Convert a JSON file into a markdown file
    Convert
    {   input: PathBuf
      , output: PathBuf
      , /// Replace the default conversion instruction
        #[arg(long)]
        instructions: Option<String>
    }
  , /// Convert a JSON file and print the markdown
    Render
    {   input: PathBuf
      , #[arg(long)]
        instructions: Option<String>
    }
  , /// List report years
    Years(SourceArgs)
  , /// List quarters for a year
    Quarters
    {   #[command(flatten)]
        source: SourceArgs
      , #[arg(long)]
        year: String
    }
  , /// Render the report for a year and quarter
    Report
    {   #[command(flatten)]
        source: SourceArgs
      , #[arg(long)]
        year: Option<String>
      , #[arg(long)]
        quarter: Option<String>
    }
}

#[derive(Args)]
struct SourceArgs
{   /// Server hosting data/filters.json and data/reports.json
    #[arg(long, env = "SERVER_BASE_URL", default_value = "http://localhost:8080")]
    base_url: String

  , /// Read the data files from a local folder instead
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>
}

impl SourceArgs
{   fn source(&self) -> ReportSource
    {   match &self.data_dir
        {   Some(dir) => ReportSource::directory(dir.clone())
          , None => ReportSource::http(self.base_url.clone())
        }
    }
}

async fn build_agent(config: Option<&PathBuf>)
  -> Result<ProcessingAgent, reportmd::Error>
{   let config = match config
    {   Some(path) => AgentConfig::load(path)?
      , None => AgentConfig::default()
    };
    Ok(ProcessingAgent::from_config(config).await)
}

async fn run(cli: Cli) -> Result<ExitCode, reportmd::Error>
{   match cli.command
    {   Commands::Convert { input, output, instructions } => {
          let agent = build_agent(cli.config.as_ref()).await?;
          if agent
            .process_file(&input, &output, instructions.as_deref())
            .await
          {   println!("Wrote {}", output.display());
              Ok(ExitCode::SUCCESS)
          } else
          {   Ok(ExitCode::FAILURE)
          }
        }
      , Commands::Render { input, instructions } => {
          let text = tokio::fs::read_to_string(&input).await?;
          let value: serde_json::Value = serde_json::from_str(&text)?;
          let agent = build_agent(cli.config.as_ref()).await?;
          let conversion = agent
            .convert(&value, instructions.as_deref())
            .await;
          println!("{}", conversion);
          Ok(ExitCode::SUCCESS)
        }
      , Commands::Years(source) => {
          let filters = source.source().filters().await?;
          for year in filters.years()
          {   println!("{}", year);
          }
          Ok(ExitCode::SUCCESS)
        }
      , Commands::Quarters { source, year } => {
          let filters = source.source().filters().await?;
          for quarter in filters.quarters(&year)
          {   println!("{}", quarter);
          }
          Ok(ExitCode::SUCCESS)
        }
      , Commands::Report { source, year, quarter } => {
          let agent = build_agent(cli.config.as_ref()).await?;
          let view = report::select_report(
            &agent
          , &source.source()
          , year.as_deref()
          , quarter.as_deref()
          ).await;
          println!("{}", view.to_markdown());
          match view
          {   report::ReportView::FetchError(_) => Ok(ExitCode::FAILURE)
            , _ => Ok(ExitCode::SUCCESS)
          }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode
{   if let Err(e) = dotenvy::dotenv()
    {   if !e.not_found()
        {   eprintln!("Ignoring unreadable .env: {}", e);
        }
    }

    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or(filter)
    ).init();
    debug!("reportmd starting");

    match run(cli).await
    {   Ok(code) => code
      , Err(e) => {
          error!("{}", e);
          ExitCode::FAILURE
        }
    }
}
