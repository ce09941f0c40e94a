//! Deploys the exploded tweetstore application to a hosting platform.
//!
//! # Usage
//!
//! ```bash
//! tweetstore-deploy --platform cloudfoundry --app-dir ./target/tweetstore \
//!     --address tweetstore.cfapps.io --username me@example.com --password secret \
//!     --property TWEETSTORE__STORE__CONTAINER=jclouds-tweets
//!
//! # Stop a previously deployed application
//! tweetstore-deploy --platform cloudfoundry --address tweetstore.cfapps.io --stop ...
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tweetstore_deploy::{
    CloudBeesClient, CloudFoundryClient, Deployer, PlatformClient, app_name_from_address,
    cloudbees, write_properties, zip_dir,
};

const CLOUD_FOUNDRY_TARGET: &str = "https://api.run.pivotal.io";

/// tweetstore deployment harness.
#[derive(Parser, Debug)]
#[command(name = "tweetstore-deploy")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Hosting platform.
    #[arg(long, value_enum)]
    platform: Platform,

    /// Exploded application directory to package.
    #[arg(long, default_value = ".")]
    app_dir: PathBuf,

    /// Application address (`<name>.cfapps.io`) or CloudBees application id.
    #[arg(long)]
    address: String,

    /// Platform API endpoint. Defaults to the platform's public endpoint.
    #[arg(long)]
    target: Option<String>,

    /// Platform user name or API key.
    #[arg(long, env = "TWEETSTORE_DEPLOY_USERNAME")]
    username: String,

    /// Platform password or API secret.
    #[arg(long, env = "TWEETSTORE_DEPLOY_PASSWORD", hide_env_values = true)]
    password: String,

    /// Application setting written to the deployed `.env` (repeatable).
    #[arg(long = "property", value_name = "KEY=VALUE", value_parser = parse_property)]
    properties: Vec<(String, String)>,

    /// Stop the application instead of deploying it.
    #[arg(long, default_value_t = false)]
    stop: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Platform {
    Cloudfoundry,
    Cloudbees,
}

impl Platform {
    fn name(self) -> &'static str {
        match self {
            Self::Cloudfoundry => "cloudfoundry",
            Self::Cloudbees => "cloudbees",
        }
    }
}

fn parse_property(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tweetstore=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    match args.platform {
        Platform::Cloudfoundry => {
            let app = app_name_from_address(&args.address)?;
            let target = args.target.as_deref().unwrap_or(CLOUD_FOUNDRY_TARGET);
            let client = CloudFoundryClient::new(target, &args.username, &args.password)?;
            run(client, app, &args).await
        }
        Platform::Cloudbees => {
            let target = args.target.as_deref().unwrap_or(cloudbees::DEFAULT_API_URL);
            let client = CloudBeesClient::new(target, &args.username, &args.password)?;
            run(client, args.address.clone(), &args).await
        }
    }
}

async fn run<C: PlatformClient>(client: C, app: String, args: &Args) -> anyhow::Result<()> {
    let mut deployer = Deployer::new(client, app);

    if args.stop {
        let mut deployer = deployer.assume_deployed();
        deployer.stop().await?;
        return Ok(());
    }

    let props: BTreeMap<String, String> = args.properties.iter().cloned().collect();
    write_properties(&args.app_dir, &props).context("Failed to write application properties")?;
    let archive = zip_dir(&args.app_dir, args.platform.name())
        .context("Failed to package application")?;

    deployer.deploy_and_wait(&archive).await?;
    info!(app = deployer.app(), platform = args.platform.name(), "Deployment complete");
    Ok(())
}
