//! Dashboard lifecycle derived from the latest status, wallet and sync values.
//!
//! Everything here is a pure function of one snapshot; scheduling lives in the
//! poller.

use crate::plugin_api::{NodeState, NodeStatus, SyncProgress, Wallet};
use crate::state::Source;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DashboardState {
    /// Backend reports no usable state; the plugin needs reinstalling
    NoState,
    Installed,
    Starting,
    Stopped,
    AwaitingWallet,
    AwaitingSyncInfo,
    Syncing,
    ReadyToRegister,
    Registered,
}

impl DashboardState {
    pub fn display_name(&self) -> &str {
        match self {
            Self::NoState => "Plugin error, please reinstall",
            Self::Installed => "Installed",
            Self::Starting => "Starting",
            Self::Stopped => "Stopped",
            Self::AwaitingWallet => "Waiting for wallet setup",
            Self::AwaitingSyncInfo => "Retrieving synchronization information",
            Self::Syncing => "Synchronizing",
            Self::ReadyToRegister => "Node ready",
            Self::Registered => "Registered",
        }
    }

    /// Actions the dashboard offers in this state.
    pub fn available_actions(&self) -> &'static [ActionKind] {
        use ActionKind::*;
        match self {
            Self::NoState | Self::AwaitingWallet => &[],
            Self::Installed | Self::Stopped => &[Start],
            Self::Starting | Self::AwaitingSyncInfo => &[Stop],
            Self::Syncing => &[Stop, Restart, Resync],
            Self::ReadyToRegister => &[Stop, RegisterNode],
            Self::Registered => &[Stop, Stake, Unstake, ClaimReward],
        }
    }
}

/// Action names without payloads, for affordance lists.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Start,
    Stop,
    Restart,
    Resync,
    RegisterNode,
    Stake,
    Unstake,
    ClaimReward,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Resync => "resync",
            Self::RegisterNode => "register-node",
            Self::Stake => "stake",
            Self::Unstake => "unstake",
            Self::ClaimReward => "claim",
        }
    }
}

/// Which sources should currently be polled.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct Enablement {
    pub status: bool,
    pub wallet: bool,
    /// Fetch the wallet before the next status poll
    pub wallet_prefetch: bool,
    pub sync_progress: bool,
    pub minipools: bool,
    pub staking_pools: bool,
    pub node_info: bool,
}

impl Enablement {
    pub fn allows(&self, source: Source) -> bool {
        match source {
            Source::Status => self.status,
            Source::Wallet => self.wallet,
            Source::SyncProgress => self.sync_progress,
            Source::Minipools => self.minipools,
            Source::StakingPools => self.staking_pools,
            Source::NodeInfo => self.node_info,
        }
    }
}

/// Derive the lifecycle state. `None` while no status has been received.
pub fn derive_state(
    status: Option<&NodeStatus>,
    wallet: Option<&Wallet>,
    sync: Option<&SyncProgress>,
) -> Option<DashboardState> {
    let status = status?;
    let state = match status.node_state {
        NodeState::NoState => DashboardState::NoState,
        NodeState::Installed => DashboardState::Installed,
        NodeState::Starting => DashboardState::Starting,
        NodeState::Stopped => DashboardState::Stopped,
        NodeState::Running => {
            if !wallet.is_some_and(Wallet::is_present) {
                DashboardState::AwaitingWallet
            } else {
                match sync {
                    None => DashboardState::AwaitingSyncInfo,
                    Some(sync) if !sync.is_synced => DashboardState::Syncing,
                    Some(_) if !status.is_registered => DashboardState::ReadyToRegister,
                    Some(_) => DashboardState::Registered,
                }
            }
        }
    };
    Some(state)
}

/// Enablement vector for the current snapshot.
///
/// `wallet` here is the last resolved wallet response (present or not); `None`
/// means the wallet has never resolved.
pub fn enablement(
    status: Option<&NodeStatus>,
    wallet: Option<&Wallet>,
    sync: Option<&SyncProgress>,
) -> Enablement {
    let running = status.is_some_and(NodeStatus::is_running);
    let registered = status.is_some_and(|s| s.is_registered);
    let synced = sync.is_some_and(|s| s.is_synced);
    let pools = running && registered && synced;

    Enablement {
        status: true,
        wallet: true,
        wallet_prefetch: wallet.is_none(),
        sync_progress: running,
        minipools: pools,
        staking_pools: pools,
        node_info: running,
    }
}
