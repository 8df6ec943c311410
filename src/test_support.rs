//! Test doubles shared by the unit tests.

use crate::error::AppError;
use crate::plugin_api::{
    ActionRequest, ActionResult, NodeInfo, NodeState, NodeStatus, PluginApi, StakingPool,
    SyncProgress, Wallet,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

// ---------------------------------------------------------------------------
// Canned single-request HTTP server
// ---------------------------------------------------------------------------

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.trim() == "content-length" {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);
            if buf.len() >= pos + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// Serve exactly one response. Returns the base URL and a handle yielding the raw
/// request text.
pub(crate) async fn serve_once(
    status_line: &'static str,
    body: &'static str,
) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });
    (format!("http://{addr}"), handle)
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// Backend whose replies tests can change between polls. A `None` reply fails
/// the call with a network error.
///
/// A call reads its reply when it arrives and, if a delay is set for it,
/// returns that reply only after the delay, like a slow backend.
pub(crate) struct FakeApi {
    pub status: Mutex<Option<NodeStatus>>,
    pub wallet: Mutex<Option<Wallet>>,
    pub sync: Mutex<Option<SyncProgress>>,
    pub report: Mutex<Option<String>>,
    pub pools: Mutex<Option<Vec<StakingPool>>>,
    pub node_info: Mutex<Option<NodeInfo>>,
    pub action_result: Mutex<Option<ActionResult>>,
    /// Consumed one per action before falling back to `action_result`
    pub scripted_actions: Mutex<VecDeque<Option<ActionResult>>>,
    pub calls: Mutex<Vec<&'static str>>,
    pub actions: Mutex<Vec<ActionRequest>>,
    delays: Mutex<HashMap<&'static str, Duration>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            status: Mutex::new(None),
            wallet: Mutex::new(None),
            sync: Mutex::new(None),
            report: Mutex::new(None),
            pools: Mutex::new(None),
            node_info: Mutex::new(None),
            action_result: Mutex::new(Some(ActionResult {
                succeeded: true,
                std_out: None,
            })),
            scripted_actions: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            actions: Mutex::new(Vec::new()),
            delays: Mutex::new(HashMap::new()),
        }
    }

    /// Hold every `name` reply for `ms` of (tokio) time.
    pub fn set_delay(&self, name: &'static str, ms: u64) {
        self.delays
            .lock()
            .unwrap()
            .insert(name, Duration::from_millis(ms));
    }

    pub fn set_status(&self, node_state: NodeState, is_registered: bool) {
        *self.status.lock().unwrap() = Some(NodeStatus {
            node_state,
            state_name: format!("{node_state:?}"),
            is_alive: true,
            is_registered,
        });
    }

    pub fn set_wallet(&self, address: Option<&str>) {
        *self.wallet.lock().unwrap() = Some(Wallet {
            address: address.map(str::to_string),
            ..Default::default()
        });
    }

    pub fn set_sync(&self, is_synced: bool) {
        *self.sync.lock().unwrap() = Some(SyncProgress {
            is_synced,
            execution_progress: if is_synced { 100.0 } else { 40.0 },
            consensus_progress: 100.0,
            ..Default::default()
        });
    }

    pub fn set_report(&self, report: &str) {
        *self.report.lock().unwrap() = Some(report.to_string());
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == name).count()
    }

    async fn reply<T: Clone>(
        &self,
        name: &'static str,
        slot: &Mutex<Option<T>>,
    ) -> Result<T, AppError> {
        self.calls.lock().unwrap().push(name);
        let reply = slot.lock().unwrap().clone();
        self.finish(name, reply).await
    }

    async fn finish<T>(&self, name: &'static str, reply: Option<T>) -> Result<T, AppError> {
        let delay = self.delays.lock().unwrap().get(name).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        reply.ok_or_else(|| AppError::network(name, "connection refused"))
    }
}

#[async_trait]
impl PluginApi for FakeApi {
    async fn status(&self) -> Result<NodeStatus, AppError> {
        self.reply("status", &self.status).await
    }

    async fn wallet(&self) -> Result<Wallet, AppError> {
        self.reply("wallet", &self.wallet).await
    }

    async fn sync_progress(&self) -> Result<SyncProgress, AppError> {
        self.reply("sync_progress", &self.sync).await
    }

    async fn minipool_report(&self) -> Result<String, AppError> {
        self.reply("minipools", &self.report).await
    }

    async fn staking_pools(&self) -> Result<Vec<StakingPool>, AppError> {
        self.reply("staking_pools", &self.pools).await
    }

    async fn node_info(&self) -> Result<NodeInfo, AppError> {
        self.reply("node_info", &self.node_info).await
    }

    async fn submit_action(&self, request: &ActionRequest) -> Result<ActionResult, AppError> {
        self.actions.lock().unwrap().push(request.clone());
        let scripted = self.scripted_actions.lock().unwrap().pop_front();
        match scripted {
            Some(reply) => {
                self.calls.lock().unwrap().push("action");
                self.finish("action", reply).await
            }
            None => self.reply("action", &self.action_result).await,
        }
    }
}
