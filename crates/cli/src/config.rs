//! Runtime configuration: command-line flags with environment fallbacks.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use recording_migrator_common::{
    DEFAULT_ITEM_TIMEOUT_SECS, DEFAULT_MIGRATION_CONCURRENCY, DEFAULT_PAGE_SIZE,
    DEFAULT_WEBEX_BASE_URL,
};
use recording_migrator_migration::MigrationOptions;
use recording_migrator_source::{Credential, SourceSettings};
use recording_migrator_storage::{AwsCredentials, StorageSettings, StoreLocation};

/// Connection and tuning settings shared by all subcommands.
#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Webex bearer token obtained from the integration's OAuth flow
    #[arg(long, env = "WEBEX_ACCESS_TOKEN", hide_env_values = true, global = true)]
    pub access_token: Option<String>,

    /// Webex API base URL
    #[arg(long, env = "WEBEX_BASE_URL", default_value = DEFAULT_WEBEX_BASE_URL, global = true)]
    pub webex_base_url: String,

    /// Items per page when listing from Webex (1 to 100)
    #[arg(long, env = "RECMIG_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE, global = true)]
    pub page_size: u32,

    /// Target bucket
    #[arg(long, env = "BUCKET_NAME", global = true)]
    pub bucket: Option<String>,

    /// Target bucket region
    #[arg(long, env = "REGION_NAME", default_value = "us-east-1", global = true)]
    pub region: String,

    /// Key prefix for migrated recordings inside the bucket
    #[arg(long, env = "RECMIG_PREFIX", default_value = "", global = true)]
    pub prefix: String,

    /// AWS access key id (default credential chain when unset)
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true, global = true)]
    pub aws_access_key_id: Option<String>,

    /// AWS secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true, global = true)]
    pub aws_secret_access_key: Option<String>,

    /// AWS session token for temporary credentials
    #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true, global = true)]
    pub aws_session_token: Option<String>,

    /// Recordings transferred concurrently
    #[arg(long, env = "RECMIG_CONCURRENCY", default_value_t = DEFAULT_MIGRATION_CONCURRENCY, global = true)]
    pub concurrency: usize,

    /// Upper bound in seconds for one recording's transfer
    #[arg(long, env = "RECMIG_ITEM_TIMEOUT_SECS", default_value_t = DEFAULT_ITEM_TIMEOUT_SECS, global = true)]
    pub item_timeout_secs: u64,
}

impl Config {
    pub fn credential(&self) -> Result<Credential> {
        let token: &str = self
            .access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .context("No Webex access token: set WEBEX_ACCESS_TOKEN or pass --access-token")?;
        Ok(Credential::new(token.trim()))
    }

    pub fn source_settings(&self) -> SourceSettings {
        SourceSettings::default()
            .with_base_url(self.webex_base_url.clone())
            .with_page_size(self.page_size)
    }

    pub fn storage_settings(&self) -> Result<StorageSettings> {
        let credentials: Option<AwsCredentials> =
            match (&self.aws_access_key_id, &self.aws_secret_access_key) {
                (Some(id), Some(secret)) => Some(AwsCredentials {
                    access_key_id: id.clone(),
                    secret_access_key: secret.clone(),
                    session_token: self.aws_session_token.clone(),
                }),
                (None, None) => None,
                _ => bail!("AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together"),
            };

        Ok(StorageSettings {
            region: self.region.clone(),
            credentials,
        })
    }

    pub fn store_location(&self) -> Result<StoreLocation> {
        let bucket: &str = self
            .bucket
            .as_deref()
            .filter(|b| !b.is_empty())
            .context("No target bucket: set BUCKET_NAME or pass --bucket")?;
        Ok(StoreLocation::new(bucket, self.region.clone()).with_prefix(self.prefix.clone()))
    }

    pub fn migration_options(&self) -> MigrationOptions {
        MigrationOptions::new()
            .with_max_concurrency(self.concurrency)
            .with_item_timeout(Duration::from_secs(self.item_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        config: Config,
    }

    fn parse(args: &[&str]) -> Config {
        let mut argv: Vec<&str> = vec!["recmig"];
        argv.extend_from_slice(args);
        TestCli::try_parse_from(argv).unwrap().config
    }

    #[test]
    fn test_store_location_from_flags() {
        let config: Config = parse(&["--bucket", "meetings", "--region", "eu-west-1", "--prefix", "webex/"]);
        let location: StoreLocation = config.store_location().unwrap();
        assert_eq!(location.bucket, "meetings");
        assert_eq!(location.region, "eu-west-1");
        assert_eq!(location.prefix, "webex");
    }

    #[test]
    fn test_half_configured_aws_credentials_rejected() {
        let config: Config = parse(&["--aws-access-key-id", "AKIA", "--aws-secret-access-key", "s"]);
        assert!(config.storage_settings().unwrap().credentials.is_some());

        let mut half: Config = config.clone();
        half.aws_secret_access_key = None;
        assert!(half.storage_settings().is_err());
    }

    #[test]
    fn test_blank_token_rejected() {
        let mut config: Config = parse(&[]);
        config.access_token = Some("   ".into());
        assert!(config.credential().is_err());
        config.access_token = Some("abc".into());
        assert_eq!(config.credential().unwrap().bearer(), "abc");
    }

    #[test]
    fn test_source_settings_page_size() {
        let config: Config = parse(&["--page-size", "25", "--webex-base-url", "http://localhost:8080/v1/"]);
        let settings: SourceSettings = config.source_settings();
        assert_eq!(settings.page_size, 25);
        assert_eq!(settings.base_url, "http://localhost:8080/v1");

        let config: Config = parse(&["--page-size", "1000"]);
        assert_eq!(config.source_settings().page_size, 100);
    }

    #[test]
    fn test_migration_options_from_flags() {
        let config: Config = parse(&["--concurrency", "8", "--item-timeout-secs", "60"]);
        let options: MigrationOptions = config.migration_options();
        assert_eq!(options.max_concurrency, 8);
        assert_eq!(options.item_timeout, Duration::from_secs(60));
    }
}
