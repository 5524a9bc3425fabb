use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lorekeeper::{cli, config};

#[derive(Parser)]
#[command(name = "lorekeeper", version, about = "Campaign knowledge index for tabletop RPG archives")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage campaigns
    Campaign {
        #[command(subcommand)]
        action: CampaignAction,
    },
    /// Manage sessions
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Analyze a transcript and ingest it into a session
    Ingest {
        session_id: i64,
        /// Path to the session transcript (plain text)
        transcript: Option<PathBuf>,
        /// Ingest a pre-computed analysis JSON file instead of generating one
        #[arg(long)]
        analysis: Option<PathBuf>,
    },
    /// Semantic search over a campaign's indexed content
    Search {
        campaign_id: i64,
        query: String,
        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Rebuild a campaign's chunk index from current entities
    Reindex { campaign_id: i64 },
    /// Merge a duplicate persona into another and delete it
    Merge {
        /// Persona that survives the merge
        target_id: i64,
        /// Persona to fold in and delete
        source_id: i64,
    },
    /// Show campaign statistics
    Stats { campaign_id: i64 },
}

#[derive(Subcommand)]
enum CampaignAction {
    /// Create a campaign
    Add {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List campaigns
    List,
}

#[derive(Subcommand)]
enum SessionAction {
    /// Create a session within a campaign
    Add { campaign_id: i64, name: String },
    /// List a campaign's sessions with processing status
    List { campaign_id: i64 },
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let config = config::LorekeeperConfig::load()?;

    // Log to stderr so stdout stays clean for command output.
    let filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Campaign { action } => match action {
            CampaignAction::Add { name, description } => {
                cli::campaign_add(&config, &name, description.as_deref())?;
            }
            CampaignAction::List => cli::campaign_list(&config)?,
        },
        Command::Session { action } => match action {
            SessionAction::Add { campaign_id, name } => {
                cli::session_add(&config, campaign_id, &name)?;
            }
            SessionAction::List { campaign_id } => cli::session_list(&config, campaign_id)?,
        },
        Command::Ingest { session_id, transcript, analysis } => {
            cli::ingest::ingest(&config, session_id, transcript.as_deref(), analysis.as_deref())?;
        }
        Command::Search { campaign_id, query, limit } => {
            cli::search::search(&config, campaign_id, &query, limit)?;
        }
        Command::Reindex { campaign_id } => cli::reindex::reindex(&config, campaign_id)?,
        Command::Merge { target_id, source_id } => {
            cli::merge::merge(&config, target_id, source_id)?;
        }
        Command::Stats { campaign_id } => cli::stats::stats(&config, campaign_id)?,
    }

    Ok(())
}
