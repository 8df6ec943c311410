use crate::error::AppError;
use crate::parsers::pool_types::{normalize_label, PoolRecord, PoolStage};

/// Blocks at the end of every report that never describe a pool.
const TRAILING_BLOCKS: usize = 2;
const BLOCK_SEPARATOR: &str = "\n\n";
const SECTION_RULE: &str = "--------------------";

/// Section a header block switches the following records into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Finalized,
    Prelaunch,
}

fn section_header(block: &str) -> Option<Section> {
    if block.contains("finalized minipool") || block.contains("Staking minipool") {
        Some(Section::Finalized)
    } else if block.contains("Prelaunch minipool") {
        Some(Section::Prelaunch)
    } else {
        None
    }
}

/// Parse the node's minipool status report into pool records, in report order.
///
/// Never fails: an anomalous report is logged and yields no pools, which the
/// dashboard shows as "no pools available".
pub fn parse_minipool_report(report: &str) -> Vec<PoolRecord> {
    match try_parse_minipool_report(report) {
        Ok(pools) => pools,
        Err(e) => {
            tracing::warn!("Failed to parse minipool report: {e}");
            Vec::new()
        }
    }
}

/// Same as [`parse_minipool_report`] but reports structural anomalies.
pub fn try_parse_minipool_report(report: &str) -> Result<Vec<PoolRecord>, AppError> {
    if report.trim().is_empty() {
        return Ok(Vec::new());
    }

    let report = report.replace("\r\n", "\n");
    let mut blocks: Vec<&str> = report.split(BLOCK_SEPARATOR).collect();
    if blocks.len() < TRAILING_BLOCKS {
        return Err(AppError::ReportAnomaly(format!(
            "expected at least {TRAILING_BLOCKS} blocks, got {}",
            blocks.len()
        )));
    }
    blocks.truncate(blocks.len() - TRAILING_BLOCKS);

    let mut pending_finalized = false;
    let mut pending_prelaunch = false;
    let mut pools = Vec::new();
    let mut i = 0;

    while i < blocks.len() {
        let block = blocks[i];

        // A header only counts when records can follow it; a lone count line at
        // the end of the list must not flip the sticky flags.
        if let Some(section) = section_header(block) {
            if i + 2 < blocks.len() {
                pending_finalized = section == Section::Finalized;
                pending_prelaunch = section == Section::Prelaunch;
                i += 1;
                continue;
            }
        }

        if !block.trim().is_empty() {
            if let Some(pool) = parse_record_block(block, pending_finalized, pending_prelaunch) {
                pools.push(pool);
            } else {
                tracing::debug!("Skipping report block without values: {:?}", block.trim());
            }
        }
        i += 1;
    }

    Ok(pools)
}

/// `Label: value` lines to a record. Lines without a colon are ignored; a block
/// with no non-empty value (rules, intro lines) is not a record.
fn parse_record_block(block: &str, finalized: bool, prelaunch: bool) -> Option<PoolRecord> {
    let mut pool = PoolRecord {
        finalized,
        prelaunch,
        ..Default::default()
    };

    for line in block.lines() {
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let key = normalize_label(label);
        if key.is_empty() {
            continue;
        }
        pool.fields.insert(key, value.trim().to_string());
    }

    if pool.fields.values().all(|v| v.is_empty()) {
        return None;
    }
    Some(pool)
}

/// Canonical report text for a parsed pool list.
///
/// Consecutive records sharing a stage are grouped under one header followed by a
/// rule block, so every header has the two blocks of lookahead the parser needs.
/// Re-parsing the output yields the same records in the same order.
pub fn to_report_text(pools: &[PoolRecord]) -> String {
    let mut blocks: Vec<String> = vec![format!("Your node has {} minipool(s):", pools.len())];

    let mut start = 0;
    while start < pools.len() {
        let stage = pools[start].stage();
        let end = pools[start..]
            .iter()
            .position(|p| p.stage() != stage)
            .map_or(pools.len(), |offset| start + offset);
        let count = end - start;

        match stage {
            PoolStage::Finalized => blocks.push(format!("{count} Staking minipool(s):")),
            PoolStage::Prelaunch => blocks.push(format!("{count} Prelaunch minipool(s):")),
            // Unflagged records only exist before the first header.
            PoolStage::Staking => {}
        }
        if stage != PoolStage::Staking {
            blocks.push(SECTION_RULE.to_string());
        }

        for pool in &pools[start..end] {
            let lines: Vec<String> = pool
                .fields
                .iter()
                .map(|(key, value)| format!("{key}: {value}"))
                .collect();
            blocks.push(lines.join("\n"));
        }
        start = end;
    }

    blocks.push("End of minipool report.".to_string());
    blocks.push(String::new());
    blocks.join(BLOCK_SEPARATOR)
}
