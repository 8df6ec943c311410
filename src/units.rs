//! Token amounts.
//!
//! The backend takes stake/unstake amounts as base-10 wei strings (18 decimals) and
//! reports balances the same way. Amounts are carried as `u128`, which covers any
//! realistic ETH/MATIC/RPL balance.

use crate::error::AppError;

pub const DECIMALS: usize = 18;
pub const WEI_PER_TOKEN: u128 = 1_000_000_000_000_000_000;

/// Parse a decimal token amount (`"1.5"`) into wei.
pub fn parse_token_amount(value: &str) -> Result<u128, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::InvalidInput("amount is empty".into()));
    }
    if value.starts_with('-') {
        return Err(AppError::InvalidInput("amount must be >= 0".into()));
    }

    let invalid = || AppError::InvalidInput(format!("invalid amount '{value}'"));

    let (whole, frac) = match value.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (value, None),
    };
    if whole.is_empty() && frac.map_or(true, str::is_empty) {
        return Err(invalid());
    }
    if !whole.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(invalid());
    }

    let whole = if whole.is_empty() {
        0u128
    } else {
        whole.parse::<u128>().map_err(|_| invalid())?
    };

    let mut frac_value = 0u128;
    if let Some(frac) = frac {
        if frac.len() > DECIMALS {
            return Err(AppError::InvalidInput(format!(
                "amount has too many decimal places '{value}'"
            )));
        }
        if !frac.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(invalid());
        }
        if !frac.is_empty() {
            let padded = format!("{frac:0<width$}", width = DECIMALS);
            frac_value = padded.parse::<u128>().map_err(|_| invalid())?;
        }
    }

    whole
        .checked_mul(WEI_PER_TOKEN)
        .and_then(|wei| wei.checked_add(frac_value))
        .ok_or_else(|| AppError::InvalidInput(format!("amount out of range '{value}'")))
}

/// Render a wei amount as a decimal token amount without trailing zeros.
pub fn format_wei(wei: u128) -> String {
    let whole = wei / WEI_PER_TOKEN;
    let frac = wei % WEI_PER_TOKEN;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:0width$}", width = DECIMALS);
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Render a wei string reported by the backend (e.g. a wallet balance).
pub fn format_wei_str(wei: &str) -> Result<String, AppError> {
    let wei = wei
        .trim()
        .parse::<u128>()
        .map_err(|_| AppError::InvalidInput(format!("invalid wei amount '{wei}'")))?;
    Ok(format_wei(wei))
}

/// Leading decimal number of a display value, the way `parseFloat` reads it:
/// `"8.000000 ETH"` is `8.0`, `"15.000000%"` is `15.0`.
pub fn leading_number(value: &str) -> Option<f64> {
    let value = value.trim_start();
    let end = value
        .char_indices()
        .find(|&(i, ch)| !(ch.is_ascii_digit() || ch == '.' || (i == 0 && (ch == '-' || ch == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    value[..end].parse::<f64>().ok()
}
