use crate::config::ApiConfig;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Node lifecycle as reported by the plugin backend.
///
/// Deserialized from the backend's state name. The current plugin enum
/// (`NodeStarted`, `NodeInstalled`, ...) is canonical; the upper-case names of older
/// plugin builds (`NODE_RUNNING`, `NODE_STOPPED`, ...) are accepted as aliases.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String")]
pub enum NodeState {
    NoState,
    Installed,
    Starting,
    Running,
    Stopped,
}

impl NodeState {
    pub fn from_wire(name: &str) -> Self {
        match name {
            "NoState" | "SetupErrorState" | "NO_STATE" | "SETUP_ERROR_STATE" => Self::NoState,
            "NodeInstalled" | "NODE_INSTALLED" => Self::Installed,
            "NodeStarted" | "NODE_RUNNING" => Self::Running,
            "NodeStopped" | "NODE_STOPPED" => Self::Stopped,
            "NodeRestarting" | "NODE_RESTARTING" => Self::Starting,
            other
                if ["Starting", "Installing", "Configuring", "STARTING_", "INSTALLING_", "CONFIGURING_"]
                    .iter()
                    .any(|prefix| other.starts_with(prefix)) =>
            {
                Self::Starting
            }
            other => {
                tracing::warn!("Unknown node state '{other}', treating as NoState");
                Self::NoState
            }
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::NoState => "No state",
            Self::Installed => "Installed",
            Self::Starting => "Starting",
            Self::Running => "Running",
            Self::Stopped => "Stopped",
        }
    }
}

impl From<String> for NodeState {
    fn from(name: String) -> Self {
        Self::from_wire(&name)
    }
}

/// `GET /status`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "NodeStatusWire")]
pub struct NodeStatus {
    pub node_state: NodeState,
    /// State name exactly as the backend sent it
    pub state_name: String,
    pub is_alive: bool,
    pub is_registered: bool,
}

#[derive(Deserialize)]
struct NodeStatusWire {
    #[serde(rename = "NodeState")]
    node_state: String,
    #[serde(rename = "Alive", default)]
    alive: bool,
    #[serde(rename = "IsRegistered", default)]
    is_registered: bool,
}

impl From<NodeStatusWire> for NodeStatus {
    fn from(wire: NodeStatusWire) -> Self {
        Self {
            node_state: NodeState::from_wire(&wire.node_state),
            state_name: wire.node_state,
            is_alive: wire.alive,
            is_registered: wire.is_registered,
        }
    }
}

impl NodeStatus {
    pub fn is_running(&self) -> bool {
        self.node_state == NodeState::Running
    }
}

/// `GET /wallet-fetch`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Wallet {
    #[serde(rename = "Wallet", default, deserialize_with = "de_non_empty")]
    pub address: Option<String>,
    #[serde(rename = "ethBalance", default, deserialize_with = "de_non_empty")]
    pub eth_balance: Option<String>,
    #[serde(rename = "maticBalance", default, deserialize_with = "de_non_empty")]
    pub matic_balance: Option<String>,
}

impl Wallet {
    pub fn is_present(&self) -> bool {
        self.address.is_some()
    }

    /// ETH balance in whole tokens; `None` when absent or not a wei amount
    pub fn eth_balance_tokens(&self) -> Option<String> {
        self.eth_balance
            .as_deref()
            .and_then(|wei| crate::units::format_wei_str(wei).ok())
    }

    pub fn matic_balance_tokens(&self) -> Option<String> {
        self.matic_balance
            .as_deref()
            .and_then(|wei| crate::units::format_wei_str(wei).ok())
    }
}

/// `GET /sync-state`
///
/// Execution/consensus field names differ per plugin (`bor`/`heimdall`,
/// `erigon`, or the generic `execution`/`consensus` names); all are accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SyncProgress {
    #[serde(rename = "IsSynced", alias = "isSynced", default)]
    pub is_synced: bool,
    #[serde(
        rename = "executionSyncProgress",
        alias = "borSyncProgress",
        alias = "erigonSyncProgress",
        default,
        deserialize_with = "de_percent"
    )]
    pub execution_progress: f64,
    #[serde(
        rename = "executionSyncProgressStepDescription",
        alias = "borStepDescription",
        alias = "erigonStepDescription",
        default
    )]
    pub execution_step: String,
    #[serde(
        rename = "consensusSyncProgress",
        alias = "heimdallSyncProgress",
        default,
        deserialize_with = "de_percent"
    )]
    pub consensus_progress: f64,
    #[serde(
        rename = "consensusSyncProgressStepDescription",
        alias = "heimdallStepDescription",
        default
    )]
    pub consensus_step: String,
}

/// One delegation pool from `GET /pools-fetch` on staking plugins
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct StakingPool {
    pub name: String,
    pub logo_url: String,
    pub current_state: String,
    pub delegation_enabled: bool,
    pub commission_percent: f64,
    pub performance_index: f64,
    /// Total stake in wei
    pub total_staked: f64,
    /// User stake in whole tokens
    pub user_stake: String,
    pub user_reward: String,
    pub min_stake: String,
    pub contract_address: String,
}

impl StakingPool {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Anonymous"
        } else {
            &self.name
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.current_state == "HEALTHY"
    }

    pub fn can_unstake(&self) -> bool {
        parse_amount(&self.user_stake) > 0.0
    }

    pub fn can_claim(&self) -> bool {
        parse_amount(&self.user_reward) > 0.0
    }
}

fn parse_amount(value: &str) -> f64 {
    crate::units::leading_number(value).unwrap_or(0.0)
}

/// `GET /node-fetch`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NodeInfo {
    #[serde(default)]
    pub node: NodeDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NodeDetails {
    #[serde(rename = "rpcUrl", default)]
    pub rpc_url: Option<String>,
    #[serde(rename = "ethWalletBalance", default, deserialize_with = "de_display")]
    pub eth_wallet_balance: Option<String>,
    #[serde(rename = "rplWalletBalance", default, deserialize_with = "de_display")]
    pub rpl_wallet_balance: Option<String>,
    /// Everything else the backend reports, kept verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Outcome of a mutating call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionResult {
    pub succeeded: bool,
    #[serde(rename = "stdOut", skip_serializing_if = "Option::is_none")]
    pub std_out: Option<String>,
}

/// Standard backend reply: `{ "result": ..., "stdOut": ... }`
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub result: T,
    #[serde(rename = "stdOut", default)]
    pub std_out: Option<String>,
}

/// Action replies may omit `result` entirely; anything but `false` is success.
#[derive(Debug, Deserialize)]
struct ActionEnvelope {
    #[serde(default)]
    result: serde_json::Value,
    #[serde(rename = "stdOut", default)]
    std_out: Option<String>,
}

impl From<ActionEnvelope> for ActionResult {
    fn from(envelope: ActionEnvelope) -> Self {
        Self {
            succeeded: envelope.result != serde_json::Value::Bool(false),
            std_out: envelope.std_out,
        }
    }
}

#[derive(Deserialize)]
struct PoolsReport {
    #[serde(default)]
    pools: Option<String>,
}

/// A fully resolved mutating request
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    /// Logical name used in diagnostics
    pub operation: String,
    pub method: Method,
    pub suffix: String,
    pub body: Option<serde_json::Value>,
}

/// Everything the dashboard needs from the plugin backend.
#[async_trait]
pub trait PluginApi: Send + Sync {
    async fn status(&self) -> Result<NodeStatus, AppError>;
    async fn wallet(&self) -> Result<Wallet, AppError>;
    async fn sync_progress(&self) -> Result<SyncProgress, AppError>;
    /// Raw minipool status report text
    async fn minipool_report(&self) -> Result<String, AppError>;
    async fn staking_pools(&self) -> Result<Vec<StakingPool>, AppError>;
    async fn node_info(&self) -> Result<NodeInfo, AppError>;
    async fn submit_action(&self, request: &ActionRequest) -> Result<ActionResult, AppError>;
}

/// HTTP client for the plugin's routes under `{base_url}/plugins/{plugin_name}`
pub struct PluginClient {
    base_url: String,
    plugin_name: String,
    timeout: Duration,
    http: Client,
}

impl PluginClient {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        url::Url::parse(&config.base_url)?;

        let timeout = config.request_timeout();
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            plugin_name: config.plugin_name.clone(),
            timeout,
            http,
        })
    }

    fn api_url(&self, suffix: &str) -> String {
        format!("{}/plugins/{}{}", self.base_url, self.plugin_name, suffix)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one request and decode the JSON body as `T`.
    ///
    /// Transport failures, timeouts and non-2xx statuses are `Network` errors,
    /// whatever the body says; an unreadable body is a `Parse` error.
    pub async fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        method: Method,
        suffix: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, AppError> {
        let mut request = self
            .http
            .request(method, self.api_url(suffix))
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        let resp = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::network(
                    operation,
                    format!("timed out after {}s", self.timeout.as_secs()),
                )
            } else {
                AppError::network(operation, e)
            }
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(200).collect();
            return Err(AppError::network(
                operation,
                format!("HTTP {status}: {excerpt}"),
            ));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| AppError::network(operation, format!("failed to read response: {e}")))?;

        serde_json::from_str::<T>(&body).map_err(|e| AppError::parse(operation, e))
    }

    async fn get_result<T: DeserializeOwned>(
        &self,
        operation: &str,
        suffix: &str,
    ) -> Result<T, AppError> {
        let envelope: Envelope<T> = self.call(operation, Method::GET, suffix, None).await?;
        Ok(envelope.result)
    }
}

#[async_trait]
impl PluginApi for PluginClient {
    async fn status(&self) -> Result<NodeStatus, AppError> {
        self.get_result("getPluginStatus", "/status").await
    }

    async fn wallet(&self) -> Result<Wallet, AppError> {
        self.get_result("getPluginWallet", "/wallet-fetch").await
    }

    async fn sync_progress(&self) -> Result<SyncProgress, AppError> {
        self.get_result("getPluginSyncProgress", "/sync-state").await
    }

    async fn minipool_report(&self) -> Result<String, AppError> {
        let report: PoolsReport = self.get_result("getMinipools", "/pools-fetch").await?;
        Ok(report.pools.unwrap_or_default())
    }

    async fn staking_pools(&self) -> Result<Vec<StakingPool>, AppError> {
        self.get_result("getStakingPools", "/pools-fetch").await
    }

    async fn node_info(&self) -> Result<NodeInfo, AppError> {
        self.get_result("getPluginNodeInformation", "/node-fetch").await
    }

    async fn submit_action(&self, request: &ActionRequest) -> Result<ActionResult, AppError> {
        let envelope: ActionEnvelope = self
            .call(
                &request.operation,
                request.method.clone(),
                &request.suffix,
                request.body.as_ref(),
            )
            .await?;
        Ok(envelope.into())
    }
}

// ---------------------------------------------------------------------------
// Lenient field decoders
// ---------------------------------------------------------------------------

fn de_non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Strings or numbers, rendered as text
fn de_display<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        other => Ok(Some(other.to_string())),
    }
}

/// Percentages arrive as numbers or numeric strings; clamp to 0..=100.
fn de_percent<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => 0.0,
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) if s.trim().is_empty() => 0.0,
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("invalid progress value '{s}'")))?,
        other => return Err(D::Error::custom(format!("invalid progress value {other}"))),
    };
    if value.is_nan() {
        return Ok(0.0);
    }
    Ok(value.clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;
    use serde_json::json;
    use tokio::net::TcpListener;

    fn client_for(base_url: &str) -> PluginClient {
        PluginClient::new(&ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        })
        .unwrap()
    }

    // -----------------------------------------------------------------------
    // Wire decoding
    // -----------------------------------------------------------------------

    #[test]
    fn node_state_canonical_and_legacy_names() {
        assert_eq!(NodeState::from_wire("NodeStarted"), NodeState::Running);
        assert_eq!(NodeState::from_wire("NODE_RUNNING"), NodeState::Running);
        assert_eq!(NodeState::from_wire("NODE_STOPPED"), NodeState::Stopped);
        assert_eq!(NodeState::from_wire("NodeInstalled"), NodeState::Installed);
        assert_eq!(NodeState::from_wire("StartingHeimdall"), NodeState::Starting);
        assert_eq!(NodeState::from_wire("ConfiguringErigon"), NodeState::Starting);
        assert_eq!(NodeState::from_wire("INSTALLING_CLI"), NodeState::Starting);
        assert_eq!(NodeState::from_wire("NodeRestarting"), NodeState::Starting);
        assert_eq!(NodeState::from_wire("SetupErrorState"), NodeState::NoState);
        assert_eq!(NodeState::from_wire("NO_STATE"), NodeState::NoState);
        assert_eq!(NodeState::from_wire("Bogus"), NodeState::NoState);
    }

    #[test]
    fn decodes_status() {
        let status: NodeStatus = serde_json::from_value(json!({
            "NodeState": "NodeStarted", "Alive": true, "IsRegistered": false
        }))
        .unwrap();
        assert_eq!(status.node_state, NodeState::Running);
        assert_eq!(status.state_name, "NodeStarted");
        assert!(status.is_alive);
        assert!(!status.is_registered);
    }

    #[test]
    fn empty_wallet_address_is_absent() {
        let wallet: Wallet = serde_json::from_value(json!({
            "Wallet": "", "maticBalance": "0", "ethBalance": "12"
        }))
        .unwrap();
        assert!(!wallet.is_present());
        assert_eq!(wallet.eth_balance.as_deref(), Some("12"));

        assert_eq!(
            wallet.eth_balance_tokens().as_deref(),
            Some("0.000000000000000012")
        );
        assert_eq!(wallet.matic_balance_tokens().as_deref(), Some("0"));

        let wallet: Wallet = serde_json::from_value(json!({
            "Wallet": "0xabc", "ethBalance": "1500000000000000000"
        }))
        .unwrap();
        assert!(wallet.is_present());
        assert_eq!(wallet.eth_balance_tokens().as_deref(), Some("1.5"));

        let wallet: Wallet = serde_json::from_value(json!({})).unwrap();
        assert_eq!(wallet, Wallet::default());
    }

    #[test]
    fn decodes_sync_progress_aliases() {
        let polygon: SyncProgress = serde_json::from_value(json!({
            "IsSynced": false,
            "borSyncProgress": 42.5,
            "borStepDescription": "Syncing",
            "heimdallSyncProgress": "100",
            "heimdallStepDescription": "Synced"
        }))
        .unwrap();
        assert!(!polygon.is_synced);
        assert_eq!(polygon.execution_progress, 42.5);
        assert_eq!(polygon.execution_step, "Syncing");
        assert_eq!(polygon.consensus_progress, 100.0);
        assert_eq!(polygon.consensus_step, "Synced");

        let generic: SyncProgress = serde_json::from_value(json!({
            "IsSynced": true,
            "executionSyncProgress": 130,
            "consensusSyncProgress": -4,
            "consensusSyncProgressStepDescription": "done"
        }))
        .unwrap();
        assert!(generic.is_synced);
        assert_eq!(generic.execution_progress, 100.0);
        assert_eq!(generic.consensus_progress, 0.0);
        assert_eq!(generic.execution_step, "");
    }

    #[test]
    fn rejects_non_numeric_progress() {
        let result: Result<SyncProgress, _> =
            serde_json::from_value(json!({ "IsSynced": false, "borSyncProgress": "soon" }));
        assert!(result.is_err());
    }

    #[test]
    fn staking_pool_helpers() {
        let pool: StakingPool = serde_json::from_value(json!({
            "name": "",
            "currentState": "HEALTHY",
            "delegationEnabled": true,
            "commissionPercent": 5,
            "userStake": "12.5",
            "userReward": "0",
            "contractAddress": "0xpool"
        }))
        .unwrap();
        assert_eq!(pool.display_name(), "Anonymous");
        assert!(pool.is_healthy());
        assert!(pool.can_unstake());
        assert!(!pool.can_claim());
        assert_eq!(pool.commission_percent, 5.0);
    }

    #[test]
    fn node_info_keeps_unknown_fields() {
        let info: NodeInfo = serde_json::from_value(json!({
            "node": {
                "rpcUrl": "http://10.0.0.2:8545",
                "ethWalletBalance": 1.25,
                "rplWalletBalance": "300",
                "nodeRPLStakedBalance": "250"
            }
        }))
        .unwrap();
        assert_eq!(info.node.rpc_url.as_deref(), Some("http://10.0.0.2:8545"));
        assert_eq!(info.node.eth_wallet_balance.as_deref(), Some("1.25"));
        assert_eq!(info.node.rpl_wallet_balance.as_deref(), Some("300"));
        assert_eq!(info.node.extra["nodeRPLStakedBalance"], json!("250"));
    }

    #[test]
    fn action_success_is_anything_but_false() {
        let cases = [
            (json!({ "result": "true" }), true),
            (json!({ "result": true }), true),
            (json!({}), true),
            (json!({ "result": "false" }), true),
            (json!({ "result": false, "stdOut": "err" }), false),
        ];
        for (body, expected) in cases {
            let envelope: ActionEnvelope = serde_json::from_value(body.clone()).unwrap();
            let result = ActionResult::from(envelope);
            assert_eq!(result.succeeded, expected, "{body}");
        }
    }

    // -----------------------------------------------------------------------
    // HTTP behavior
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn get_status_over_http() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"result":{"NodeState":"NODE_RUNNING","Alive":true,"IsRegistered":true}}"#,
        )
        .await;
        let client = client_for(&base);

        let status = client.status().await.unwrap();
        assert!(status.is_running());
        assert!(status.is_registered);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /plugins/keepix-polygon-plugin/status HTTP/1.1"));
        assert!(request.to_lowercase().contains("content-type: application/json"));
    }

    #[tokio::test]
    async fn minipool_report_extracts_pools_text() {
        let (base, server) = serve_once("200 OK", r#"{"result":{"pools":"a\n\nb"}}"#).await;
        let report = client_for(&base).minipool_report().await.unwrap();
        assert_eq!(report, "a\n\nb");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn non_2xx_is_network_error_with_operation_name() {
        let (base, server) =
            serve_once("500 Internal Server Error", r#"{"result":{"NodeState":"NodeStarted"}}"#).await;
        let err = client_for(&base).status().await.unwrap_err();
        match &err {
            AppError::Network { operation, reason } => {
                assert_eq!(operation, "getPluginStatus");
                assert!(reason.contains("500"), "{reason}");
            }
            other => panic!("expected network error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn invalid_json_is_parse_error() {
        let (base, server) = serve_once("200 OK", "<html>not json</html>").await;
        let err = client_for(&base).wallet().await.unwrap_err();
        assert!(
            matches!(&err, AppError::Parse { operation, .. } if operation == "getPluginWallet"),
            "{err:?}"
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn post_action_sends_json_body() {
        let (base, server) =
            serve_once("200 OK", r#"{"result":false,"stdOut":"insufficient funds"}"#).await;
        let request = ActionRequest {
            operation: "postPluginStake".into(),
            method: Method::POST,
            suffix: "/stake".into(),
            body: Some(json!({ "amount": "1000000000000000000", "address": "0xpool" })),
        };

        let result = client_for(&base).submit_action(&request).await.unwrap();
        assert!(!result.succeeded);
        assert_eq!(result.std_out.as_deref(), Some("insufficient funds"));

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /plugins/keepix-polygon-plugin/stake HTTP/1.1"));
        let body = raw.split("\r\n\r\n").nth(1).unwrap();
        let sent: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(sent["address"], "0xpool");
        assert_eq!(sent["amount"], "1000000000000000000");
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_error() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(&format!("http://{addr}")).status().await.unwrap_err();
        assert!(matches!(err, AppError::Network { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn slow_backend_times_out_as_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        });

        let client = PluginClient::new(&ApiConfig {
            base_url: format!("http://{addr}"),
            request_timeout_secs: 1,
            ..ApiConfig::default()
        })
        .unwrap();

        let err = client.status().await.unwrap_err();
        match err {
            AppError::Network { reason, .. } => assert!(reason.contains("timed out"), "{reason}"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
