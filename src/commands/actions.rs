use crate::config::ApiConfig;
use crate::error::AppError;
use crate::plugin_api::{ActionRequest, ActionResult, PluginApi};
use crate::status::ActionKind;
use crate::units;
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// A user-triggered mutating operation on the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Start,
    Stop,
    Restart,
    /// Wipe and resynchronize the selected chain clients
    Resync { execution: bool, consensus: bool },
    RegisterNode,
    Stake { amount_wei: String, address: String },
    Unstake { amount_wei: String, address: String },
    ClaimReward { address: String },
}

impl Action {
    /// The affordance this action fulfils.
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Start => ActionKind::Start,
            Self::Stop => ActionKind::Stop,
            Self::Restart => ActionKind::Restart,
            Self::Resync { .. } => ActionKind::Resync,
            Self::RegisterNode => ActionKind::RegisterNode,
            Self::Stake { .. } => ActionKind::Stake,
            Self::Unstake { .. } => ActionKind::Unstake,
            Self::ClaimReward { .. } => ActionKind::ClaimReward,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Resolve an action from its name and optional JSON payload.
    ///
    /// Stake and unstake take `{"amount": "1.5", "address": "0x.."}` with the amount
    /// in whole tokens; it is converted to wei here. Resync takes
    /// `{"execution": true, "consensus": false}`.
    pub fn from_request(name: &str, payload: Option<&Value>) -> Result<Self, AppError> {
        let action = match name.trim().to_ascii_lowercase().as_str() {
            "start" => Self::Start,
            "stop" => Self::Stop,
            "restart" => Self::Restart,
            "register" | "register-node" => Self::RegisterNode,
            "resync" => {
                let execution = flag(payload, "execution");
                let consensus = flag(payload, "consensus");
                if !execution && !consensus {
                    return Err(AppError::InvalidInput(
                        "resync needs execution and/or consensus".into(),
                    ));
                }
                Self::Resync {
                    execution,
                    consensus,
                }
            }
            "resync-execution" | "resync-eth1" => Self::Resync {
                execution: true,
                consensus: false,
            },
            "resync-consensus" | "resync-eth2" => Self::Resync {
                execution: false,
                consensus: true,
            },
            "stake" => Self::Stake {
                amount_wei: amount(payload)?,
                address: address(payload)?,
            },
            "unstake" => Self::Unstake {
                amount_wei: amount(payload)?,
                address: address(payload)?,
            },
            "claim" | "reward" | "claim-reward" => Self::ClaimReward {
                address: address(payload)?,
            },
            other => {
                return Err(AppError::InvalidInput(format!("unknown action '{other}'")));
            }
        };
        Ok(action)
    }

    /// HTTP calls that carry out this action, in order.
    ///
    /// Only a legacy resync of both clients needs two calls.
    pub fn requests(&self, api: &ApiConfig) -> Vec<ActionRequest> {
        let get = |suffix: &str| ActionRequest {
            operation: self.name().to_string(),
            method: Method::GET,
            suffix: suffix.to_string(),
            body: None,
        };
        let post = |suffix: &str, body: Value| ActionRequest {
            operation: self.name().to_string(),
            method: Method::POST,
            suffix: suffix.to_string(),
            body: Some(body),
        };

        match self {
            Self::Start => vec![get("/start")],
            Self::Stop => vec![get("/stop")],
            Self::Restart => vec![get("/restart")],
            Self::RegisterNode => vec![get("/register-node")],
            Self::Resync {
                execution,
                consensus,
            } if api.legacy_resync_paths => {
                let mut requests = Vec::new();
                if *execution {
                    requests.push(get("/resync-eth1"));
                }
                if *consensus {
                    requests.push(get("/resync-eth2"));
                }
                requests
            }
            Self::Resync {
                execution,
                consensus,
            } => {
                let mut body = serde_json::Map::new();
                body.insert(api.execution_client.clone(), json!(execution.to_string()));
                body.insert(api.consensus_client.clone(), json!(consensus.to_string()));
                vec![post("/resync", Value::Object(body))]
            }
            Self::Stake {
                amount_wei,
                address,
            } => vec![post(
                "/stake",
                json!({ "amount": amount_wei, "address": address }),
            )],
            Self::Unstake {
                amount_wei,
                address,
            } => vec![post(
                "/unstake",
                json!({ "amount": amount_wei, "address": address }),
            )],
            Self::ClaimReward { address } => vec![post("/reward", json!({ "address": address }))],
        }
    }
}

fn flag(payload: Option<&Value>, key: &str) -> bool {
    match payload.and_then(|p| p.get(key)) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn amount(payload: Option<&Value>) -> Result<String, AppError> {
    let raw = match payload.and_then(|p| p.get("amount")) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(AppError::InvalidInput("amount is required".into())),
    };
    let wei = units::parse_token_amount(&raw)?;
    if wei == 0 {
        return Err(AppError::InvalidInput("amount must be > 0".into()));
    }
    Ok(wei.to_string())
}

fn address(payload: Option<&Value>) -> Result<String, AppError> {
    payload
        .and_then(|p| p.get("address"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::InvalidInput("address is required".into()))
}

// ==========================================
// Submission
// ==========================================

/// Sends actions to the backend and reports their outcome.
///
/// No retries. Callers must not run two mutating actions for the same target at
/// once; nothing here prevents it.
#[derive(Clone)]
pub struct ActionSubmitter {
    api: Arc<dyn PluginApi>,
    config: ApiConfig,
}

impl ActionSubmitter {
    pub fn new(api: Arc<dyn PluginApi>, config: ApiConfig) -> Self {
        Self { api, config }
    }

    pub async fn submit(&self, action: &Action) -> Result<ActionResult, AppError> {
        let span = tracing::info_span!("action", name = action.name(), invocation = %Uuid::new_v4());
        async {
            tracing::info!("Submitting {}", action.name());

            let mut outputs = Vec::new();
            let mut succeeded = true;
            let mut completed: Vec<String> = Vec::new();
            for request in action.requests(&self.config) {
                let result = match self.api.submit_action(&request).await {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::warn!("{} {} failed: {e}", request.method, request.suffix);
                        if completed.is_empty() {
                            return Err(e);
                        }
                        // Earlier steps already ran on the node
                        return Err(AppError::network(
                            action.name(),
                            format!(
                                "{} failed after {} completed: {e}",
                                request.suffix,
                                completed.join(", ")
                            ),
                        ));
                    }
                };
                completed.push(request.suffix.clone());
                succeeded &= result.succeeded;
                outputs.extend(result.std_out);
                if !result.succeeded {
                    break;
                }
            }

            if succeeded {
                tracing::info!("{} succeeded", action.name());
            } else {
                tracing::warn!("{} reported failure", action.name());
            }

            Ok::<_, AppError>(ActionResult {
                succeeded,
                std_out: (!outputs.is_empty()).then(|| outputs.join("\n")),
            })
        }
        .instrument(span)
        .await
    }

    /// [`Action::from_request`] followed by [`Self::submit`].
    pub async fn submit_named(
        &self,
        name: &str,
        payload: Option<&Value>,
    ) -> Result<ActionResult, AppError> {
        let action = Action::from_request(name, payload)?;
        self.submit(&action).await
    }
}
