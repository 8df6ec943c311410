use crate::parsers::pool_types::{PoolRecord, PoolTotals};
use crate::plugin_api::{NodeInfo, NodeStatus, StakingPool, SyncProgress, Wallet};
use crate::status::{DashboardState, Enablement};
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// A polled backend endpoint.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Status,
    Wallet,
    SyncProgress,
    Minipools,
    StakingPools,
    NodeInfo,
}

impl Source {
    pub const ALL: [Source; 6] = [
        Source::Status,
        Source::Wallet,
        Source::SyncProgress,
        Source::Minipools,
        Source::StakingPools,
        Source::NodeInfo,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Wallet => "wallet",
            Self::SyncProgress => "sync_progress",
            Self::Minipools => "minipools",
            Self::StakingPools => "staking_pools",
            Self::NodeInfo => "node_info",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoded reply of one source.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum SourceValue {
    Status(NodeStatus),
    Wallet(Wallet),
    SyncProgress(SyncProgress),
    Minipools(Vec<PoolRecord>),
    StakingPools(Vec<StakingPool>),
    NodeInfo(NodeInfo),
}

impl SourceValue {
    pub fn source(&self) -> Source {
        match self {
            Self::Status(_) => Source::Status,
            Self::Wallet(_) => Source::Wallet,
            Self::SyncProgress(_) => Source::SyncProgress,
            Self::Minipools(_) => Source::Minipools,
            Self::StakingPools(_) => Source::StakingPools,
            Self::NodeInfo(_) => Source::NodeInfo,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Entry {
    pub value: SourceValue,
    pub fetched_at: DateTime<Utc>,
}

/// Latest known value per source plus what was derived from them.
///
/// Only the poller writes a snapshot. Values of sources that are currently disabled
/// are never returned, even when a late reply stored one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    entries: BTreeMap<Source, Entry>,
    pub enablement: Enablement,
    /// `None` until the first status reply
    pub state: Option<DashboardState>,
}

impl Snapshot {
    pub fn is_enabled(&self, source: Source) -> bool {
        self.enablement.allows(source)
    }

    pub fn entry(&self, source: Source) -> Option<&Entry> {
        self.entries
            .get(&source)
            .filter(|_| self.is_enabled(source))
    }

    pub fn latest(&self, source: Source) -> Option<&SourceValue> {
        self.entry(source).map(|entry| &entry.value)
    }

    pub(crate) fn insert(&mut self, value: SourceValue) {
        self.entries.insert(
            value.source(),
            Entry {
                value,
                fetched_at: Utc::now(),
            },
        );
    }

    pub(crate) fn clear(&mut self, source: Source) -> bool {
        self.entries.remove(&source).is_some()
    }

    /// Stored value regardless of enablement
    pub(crate) fn stored(&self, source: Source) -> Option<&SourceValue> {
        self.entries.get(&source).map(|entry| &entry.value)
    }

    pub(crate) fn raw_wallet(&self) -> Option<&Wallet> {
        match self.stored(Source::Wallet) {
            Some(SourceValue::Wallet(wallet)) => Some(wallet),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<&NodeStatus> {
        match self.latest(Source::Status) {
            Some(SourceValue::Status(status)) => Some(status),
            _ => None,
        }
    }

    pub fn wallet(&self) -> Option<&Wallet> {
        match self.latest(Source::Wallet) {
            Some(SourceValue::Wallet(wallet)) => Some(wallet),
            _ => None,
        }
    }

    pub fn sync_progress(&self) -> Option<&SyncProgress> {
        match self.latest(Source::SyncProgress) {
            Some(SourceValue::SyncProgress(sync)) => Some(sync),
            _ => None,
        }
    }

    pub fn minipools(&self) -> Option<&[PoolRecord]> {
        match self.latest(Source::Minipools) {
            Some(SourceValue::Minipools(pools)) => Some(pools),
            _ => None,
        }
    }

    pub fn pool_totals(&self) -> Option<PoolTotals> {
        self.minipools().map(PoolTotals::from_records)
    }

    pub fn staking_pools(&self) -> Option<&[StakingPool]> {
        match self.latest(Source::StakingPools) {
            Some(SourceValue::StakingPools(pools)) => Some(pools),
            _ => None,
        }
    }

    pub fn node_info(&self) -> Option<&NodeInfo> {
        match self.latest(Source::NodeInfo) {
            Some(SourceValue::NodeInfo(info)) => Some(info),
            _ => None,
        }
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("state", &self.state)?;
        map.serialize_entry("enablement", &self.enablement)?;
        for source in Source::ALL {
            if let Some(entry) = self.entry(source) {
                map.serialize_entry(source.name(), entry)?;
            }
        }
        if let Some(totals) = self.pool_totals() {
            map.serialize_entry("pool_totals", &totals)?;
        }
        map.end()
    }
}
