use crate::commands::actions::ActionSubmitter;
use crate::config::{DashboardConfig, PoolFormat};
use crate::error::AppError;
use crate::parsers::minipool_report::parse_minipool_report;
use crate::parsers::pool_types::PoolTotals;
use crate::plugin_api::{PluginApi, PluginClient};
use crate::watchers::poller::Poller;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line client for a Keepix node plugin.
#[derive(Debug, Parser)]
#[command(name = "keepix-dashboard")]
#[command(about = "Watch and control a Keepix node plugin")]
pub struct Cli {
    /// Config file (defaults to <config dir>/keepix-dashboard/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `keepix_dashboard_lib=debug`
    #[arg(long, global = true)]
    pub log: Option<String>,

    /// Keepix API root, overrides the config file
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Plugin identifier, overrides the config file
    #[arg(long, global = true)]
    pub plugin: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll the plugin and print every snapshot change as a JSON line
    Watch {
        /// Exit after the first snapshot with a known node state
        #[arg(long)]
        once: bool,
    },
    /// Print the plugin's pools
    Pools {
        /// Parse a saved minipool report instead of fetching one
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Run a node action (start, stop, restart, resync, register, stake, unstake, claim)
    Action {
        name: String,
        /// Token amount for stake/unstake, in whole tokens
        #[arg(long)]
        amount: Option<String>,
        /// Pool or validator address for stake/unstake/claim
        #[arg(long)]
        address: Option<String>,
        /// Resync the execution client
        #[arg(long)]
        execution: bool,
        /// Resync the consensus client
        #[arg(long)]
        consensus: bool,
    },
}

impl Cli {
    pub fn load_config(&self) -> Result<DashboardConfig, AppError> {
        let path = self.config.clone().or_else(crate::config::default_config_path);
        let mut config = DashboardConfig::load_from(path)?;
        if let Some(base_url) = &self.base_url {
            config.api.base_url = base_url.clone();
        }
        if let Some(plugin) = &self.plugin {
            config.api.plugin_name = plugin.clone();
        }
        if let Some(level) = &self.log {
            config.log.level = level.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let text = serde_json::to_string(value).map_err(|e| AppError::Internal(e.to_string()))?;
    println!("{text}");
    Ok(())
}

pub async fn execute(command: Command, config: DashboardConfig) -> Result<(), AppError> {
    let client: Arc<dyn PluginApi> = Arc::new(PluginClient::new(&config.api)?);

    match command {
        Command::Watch { once } => watch(client, &config, once).await,
        Command::Pools { file } => pools(client.as_ref(), &config, file).await,
        Command::Action {
            name,
            amount,
            address,
            execution,
            consensus,
        } => {
            let mut payload = serde_json::Map::new();
            if let Some(amount) = amount {
                payload.insert("amount".into(), Value::String(amount));
            }
            if let Some(address) = address {
                payload.insert("address".into(), Value::String(address));
            }
            payload.insert("execution".into(), json!(execution));
            payload.insert("consensus".into(), json!(consensus));

            let submitter = ActionSubmitter::new(client, config.api.clone());
            let result = submitter
                .submit_named(&name, Some(&Value::Object(payload)))
                .await?;
            print_json(&result)
        }
    }
}

async fn watch(
    client: Arc<dyn PluginApi>,
    config: &DashboardConfig,
    once: bool,
) -> Result<(), AppError> {
    let poller = Poller::spawn(client, config);
    let mut updates = poller.subscribe();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                print_json(&snapshot)?;
                if once && snapshot.state.is_some() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    poller.shutdown().await;
    Ok(())
}

async fn pools(
    client: &dyn PluginApi,
    config: &DashboardConfig,
    file: Option<PathBuf>,
) -> Result<(), AppError> {
    let report = match (file, config.api.pool_format) {
        (Some(path), _) => tokio::fs::read_to_string(path).await?,
        (None, PoolFormat::MinipoolReport) => client.minipool_report().await?,
        (None, PoolFormat::StakingPools) => {
            let pools = client.staking_pools().await?;
            return print_json(&pools);
        }
    };

    let records = parse_minipool_report(&report);
    let totals = PoolTotals::from_records(&records);
    print_json(&json!({ "pools": records, "totals": totals }))
}
