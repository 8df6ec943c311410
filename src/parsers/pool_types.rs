use crate::units::leading_number;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle section a minipool was listed under in the node report
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PoolStage {
    Staking,
    Finalized,
    Prelaunch,
}

impl PoolStage {
    pub fn display_name(&self) -> &str {
        match self {
            Self::Staking => "Staking",
            Self::Finalized => "Finalized",
            Self::Prelaunch => "Prelaunch",
        }
    }

    pub fn color(&self) -> &str {
        match self {
            Self::Staking => "green",
            Self::Finalized => "gray",
            Self::Prelaunch => "yellow",
        }
    }
}

/// One minipool block of the backend's text report.
///
/// `finalized` and `prelaunch` come from the section header preceding the block and
/// are never both set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PoolRecord {
    pub fields: BTreeMap<String, String>,
    pub finalized: bool,
    pub prelaunch: bool,
}

impl PoolRecord {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn stage(&self) -> PoolStage {
        if self.finalized {
            PoolStage::Finalized
        } else if self.prelaunch {
            PoolStage::Prelaunch
        } else {
            PoolStage::Staking
        }
    }

    pub fn address(&self) -> Option<&str> {
        self.get("Address")
    }

    /// ETH bonded by the node operator (`Node deposit`)
    pub fn node_deposit(&self) -> Option<f64> {
        self.get("Node-deposit").and_then(leading_number)
    }

    /// ETH borrowed from the protocol pool (`RP deposit`)
    pub fn rp_deposit(&self) -> Option<f64> {
        self.get("RP-deposit").and_then(leading_number)
    }
}

/// Aggregates shown on the node card
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct PoolTotals {
    pub pools: usize,
    pub total_staked: f64,
    pub total_borrowed: f64,
}

impl PoolTotals {
    pub fn from_records(records: &[PoolRecord]) -> Self {
        Self {
            pools: records.len(),
            total_staked: records.iter().filter_map(PoolRecord::node_deposit).sum(),
            total_borrowed: records.iter().filter_map(PoolRecord::rp_deposit).sum(),
        }
    }
}

/// Normalize a free-text report label into a field key:
/// `" Node deposit "` becomes `Node-deposit`.
pub fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join("-")
}
