use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::{info, warn};
use recording_migrator_common::{progress_fn, BatchProgress, ProgressCallback};
use recording_migrator_migration::{MigrationError, MigrationService};
use recording_migrator_source::{
    Credential, RecordingQuery, Site, SourceSession, WebexCatalogClient,
};
use recording_migrator_storage_crt::CrtStorageClient;

mod config;
mod output;

use config::Config;

/// Move Webex cloud recordings into an S3 bucket and clean up the originals
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List sites visible to the access token
    Sites,
    /// List people who can host recordings
    People,
    /// List recordings and whether each is already in the store
    Recordings(SessionArgs),
    /// List meeting ids already present in the store
    Migrated,
    /// Migrate recordings to the store and delete confirmed ones from Webex
    Migrate {
        #[command(flatten)]
        session: SessionArgs,

        /// Meeting recording ids to migrate
        #[arg(required = true)]
        meeting_ids: Vec<String>,
    },
}

/// Which recordings a session covers.
#[derive(clap::Args, Debug)]
struct SessionArgs {
    /// First day of the window (YYYY-MM-DD)
    #[arg(long)]
    from: NaiveDate,

    /// Last day of the window (YYYY-MM-DD)
    #[arg(long)]
    to: NaiveDate,

    /// Site URL (defaults to the account's default site)
    #[arg(long)]
    site: Option<String>,

    /// Host email
    #[arg(long, conflicts_with = "person", required_unless_present = "person")]
    host: Option<String>,

    /// Host person id, resolved to their primary email
    #[arg(long)]
    person: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level: &str = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();

    let credential: Credential = cli.config.credential()?;
    let catalog = Arc::new(
        WebexCatalogClient::new(cli.config.source_settings())
            .context("Failed to create Webex client")?,
    );

    match &cli.command {
        Command::Sites => {
            let sites: Vec<Site> = catalog.list_sites(&credential).await.map_err(session_error)?;
            output::print_sites(&sites, cli.json);
        }
        Command::People => {
            let people = catalog.list_people(&credential).await.map_err(session_error)?;
            output::print_people(&people, cli.json);
        }
        Command::Recordings(args) => {
            let session: SourceSession = build_session(&catalog, credential, args).await?;
            let service = build_service(&cli.config, catalog).await?;
            let recordings = service
                .list_source_recordings(&session)
                .await
                .map_err(session_error)?;
            output::print_recordings(&recordings, cli.json);
        }
        Command::Migrated => {
            let service = build_service(&cli.config, catalog).await?;
            let ids: HashSet<String> = service.list_migrated_ids().await.map_err(session_error)?;
            let mut ids: Vec<String> = ids.into_iter().collect();
            ids.sort();
            output::print_migrated_ids(&ids, cli.json);
        }
        Command::Migrate {
            session: args,
            meeting_ids,
        } => {
            let session: SourceSession = build_session(&catalog, credential, args).await?;
            let service = build_service(&cli.config, catalog).await?;

            let progress: &dyn ProgressCallback = &progress_fn(|p: &BatchProgress| {
                let status: &str = if p.succeeded { "transferred" } else { "failed" };
                info!("[{}/{}] {} {}", p.completed, p.total, p.meeting_id, status);
                true
            });

            let result = service
                .migrate_batch(&session, meeting_ids, Some(progress))
                .await
                .map_err(session_error)?;

            if !result.failed.is_empty() {
                warn!("{} recording(s) were not migrated", result.failed.len());
            }
            output::print_result(&result, cli.json);
        }
    }

    Ok(())
}

async fn build_service(
    config: &Config,
    catalog: Arc<WebexCatalogClient>,
) -> Result<MigrationService<WebexCatalogClient, CrtStorageClient>> {
    let location = config.store_location()?;
    let store = CrtStorageClient::new(config.storage_settings()?)
        .await
        .context("Failed to create S3 client")?;

    let service = MigrationService::new(catalog, Arc::new(store), location)
        .with_options(config.migration_options());
    let target = service.location();
    info!("Target store: s3://{}/{}", target.bucket, target.prefix);
    Ok(service)
}

async fn build_session(
    catalog: &WebexCatalogClient,
    credential: Credential,
    args: &SessionArgs,
) -> Result<SourceSession> {
    let window: RecordingQuery = RecordingQuery::new(args.from, args.to)?;

    let host_email: String = match (&args.host, &args.person) {
        (Some(email), _) => email.clone(),
        (None, Some(person_id)) => catalog
            .resolve_host_email(&credential, person_id)
            .await
            .map_err(session_error)
            .with_context(|| format!("Failed to resolve host email for person {}", person_id))?,
        (None, None) => return Err(anyhow!("either --host or --person is required")),
    };

    let site_url: String = match &args.site {
        Some(site) => site.clone(),
        None => {
            let sites: Vec<Site> = catalog.list_sites(&credential).await.map_err(session_error)?;
            sites
                .iter()
                .find(|s| s.default)
                .or_else(|| sites.first())
                .map(|s| s.site_url.clone())
                .context("The access token has no sites; pass --site")?
        }
    };

    Ok(SourceSession::new(credential, site_url, host_email, window))
}

/// Turn a session-level failure into one actionable message.
fn session_error(err: impl Into<MigrationError>) -> anyhow::Error {
    let err: MigrationError = err.into();
    if err.is_reauthentication_required() {
        anyhow!("{}\nThe credential was rejected; obtain a new access token and retry.", err)
    } else {
        anyhow!(err)
    }
}
