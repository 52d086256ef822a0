// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ibmcloud_installer::{
    client::{Api, Client, ClientConfig},
    dns_zones::{create_api_dns_records, ApiDnsTargets},
    install_config::{InstallConfig, PublishingStrategy},
    manifests::{render, write_all, ManifestInput},
    metadata::Metadata,
    subnets::Subnet,
    validation::{validate, validate_pre_existing_public_dns, validate_service_endpoints},
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// IBM Cloud platform layer for cluster installation.
#[derive(Debug, Parser)]
#[command(name = "ibmcloud-installer", version, about)]
struct Cli {
    /// Log output format
    #[arg(long, env = "RUST_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    /// IBM Cloud API key
    #[arg(long, env = "IC_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Publish {
    External,
    Internal,
}

impl From<Publish> for PublishingStrategy {
    fn from(value: Publish) -> Self {
        match value {
            Publish::External => PublishingStrategy::External,
            Publish::Internal => PublishingStrategy::Internal,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate an install-config against the IBM Cloud account
    Validate {
        /// Path to install-config.yaml
        #[arg(short = 'c', long = "install-config")]
        install_config: PathBuf,
    },

    /// Generate Cluster API manifests
    Manifests {
        /// Path to install-config.yaml
        #[arg(short = 'c', long = "install-config")]
        install_config: PathBuf,

        /// Infrastructure ID prefixing every cloud resource
        #[arg(long)]
        infra_id: String,

        /// Directory the manifests are written to
        #[arg(short = 'o', long = "output-dir")]
        output_dir: PathBuf,
    },

    /// List the DNS zones usable as a base domain
    Zones {
        #[arg(long, value_enum, default_value_t = Publish::External)]
        publish: Publish,
    },

    /// Create the api and api-int DNS records of a cluster
    DnsRecords {
        /// Path to install-config.yaml
        #[arg(short = 'c', long = "install-config")]
        install_config: PathBuf,

        /// Hostname of the public load balancer
        #[arg(long)]
        public_target: Option<String>,

        /// Hostname of the private load balancer
        #[arg(long)]
        private_target: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("ibmcloud-installer")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    // Format: timestamp file:line LEVEL message
    // Respects RUST_LOG if set, otherwise defaults to INFO level
    init_logging(cli.log_format);
    debug!("Logging initialized with file and line number tracking");

    let api_key = cli
        .api_key
        .context("An IBM Cloud API key is required (--api-key or IC_API_KEY)")?;

    match cli.command {
        Command::Validate { install_config } => run_validate(&install_config, api_key).await,
        Command::Manifests {
            install_config,
            infra_id,
            output_dir,
        } => run_manifests(&install_config, api_key, &infra_id, &output_dir).await,
        Command::Zones { publish } => run_zones(api_key, publish.into()).await,
        Command::DnsRecords {
            install_config,
            public_target,
            private_target,
        } => {
            let targets = ApiDnsTargets {
                public: public_target,
                private: private_target,
            };
            run_dns_records(&install_config, api_key, &targets).await
        }
    }
}

fn init_logging(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_writer(std::io::stderr)
                .json()
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

fn metadata_for(config: &InstallConfig, api_key: String) -> Metadata {
    let client_config = ClientConfig::new(api_key)
        .with_service_endpoints(config.ibmcloud().service_endpoints.clone());
    Metadata::new(config).with_client_config(client_config)
}

async fn run_validate(path: &Path, api_key: String) -> Result<()> {
    let config = InstallConfig::load(path).await?;
    info!(path = %path.display(), cluster = %config.cluster_name(), "Validating install-config");

    // Endpoint overrides feed the client, so they are checked before it is built.
    if let Err(e) = validate_service_endpoints(&config.ibmcloud().service_endpoints) {
        error!(error = %e, "Invalid service endpoint overrides");
        anyhow::bail!("install-config validation failed: {e}");
    }

    let metadata = metadata_for(&config, api_key);
    let client = metadata.client().await?;

    let mut failures: Vec<String> = Vec::new();
    if let Err(e) = validate(client.as_ref(), &config).await {
        failures.push(e.to_string());
    }
    if let Err(e) = validate_pre_existing_public_dns(client.as_ref(), &config, &metadata).await {
        failures.push(e.to_string());
    }

    if failures.is_empty() {
        info!("install-config is valid");
        return Ok(());
    }
    for failure in &failures {
        error!(error = %failure, "Validation failed");
    }
    anyhow::bail!("install-config validation failed: {}", failures.join("; "))
}

async fn run_manifests(
    path: &Path,
    api_key: String,
    infra_id: &str,
    output_dir: &Path,
) -> Result<()> {
    let config = InstallConfig::load(path).await?;
    let metadata = metadata_for(&config, api_key);
    let client = metadata.client().await?;

    let region_zones = client
        .get_vpc_zones_for_region(metadata.region())
        .await
        .with_context(|| format!("Failed to list zones of region {}", metadata.region()))?;
    let platform = config.ibmcloud();
    let control_plane = in_config_order(
        &platform.control_plane_subnets,
        metadata.control_plane_subnets().await?,
    );
    let compute = in_config_order(&platform.compute_subnets, metadata.compute_subnets().await?);

    let input = ManifestInput::new(infra_id, &config, region_zones).with_subnets(control_plane, compute);
    let files = render(&input)?;
    write_all(output_dir, &files).await?;

    info!(
        infra_id = %infra_id,
        count = files.len(),
        dir = %output_dir.display(),
        "Generated manifests"
    );
    Ok(())
}

/// Order resolved subnets the way the install-config lists them.
fn in_config_order(names: &[String], resolved: BTreeMap<String, Subnet>) -> Vec<Subnet> {
    names
        .iter()
        .filter_map(|name| resolved.values().find(|s| &s.name == name).cloned())
        .collect()
}

async fn run_zones(api_key: String, publish: PublishingStrategy) -> Result<()> {
    let client = Client::new(ClientConfig::new(api_key))?;
    let zones = client
        .get_dns_zones(publish)
        .await
        .with_context(|| format!("Failed to list {publish} DNS zones"))?;

    info!(publish = %publish, count = zones.len(), "Listed DNS zones");
    for zone in zones {
        println!("{}\t{}\t{}", zone.name, zone.instance_name, zone.resource_group_id);
    }
    Ok(())
}

async fn run_dns_records(path: &Path, api_key: String, targets: &ApiDnsTargets) -> Result<()> {
    let config = InstallConfig::load(path).await?;
    let metadata = metadata_for(&config, api_key);
    let client = metadata.client().await?;

    create_api_dns_records(client.as_ref(), &metadata, config.cluster_name(), targets).await?;
    info!(
        cluster = %config.cluster_name(),
        publish = %config.publish,
        "Created API DNS records"
    );
    Ok(())
}
