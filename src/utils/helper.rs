use std::str::FromStr;

use alloy_primitives::{hex, Address, U256};

/// Parse an EVM address from string, with better error messages
pub fn parse_address(s: &str) -> anyhow::Result<Address> {
    Address::from_str(s.trim()).map_err(|e| anyhow::anyhow!("Invalid address {}: {}", s, e))
}

/// Lossy conversion of a raw integer amount to `f64`
pub fn u256_to_f64(value: U256) -> f64 {
    match u128::try_from(value) {
        Ok(small) => small as f64,
        Err(_) => value.to_string().parse().unwrap_or(f64::MAX),
    }
}

/// Scale a raw fixed-point amount down by `decimals`
pub fn from_units(raw: U256, decimals: u8) -> f64 {
    u256_to_f64(raw) / 10f64.powi(decimals as i32)
}

/// Scale a decimal amount up to raw units, rounding to the nearest unit
pub fn to_units(amount: f64, decimals: u8) -> U256 {
    if !amount.is_finite() || amount <= 0.0 {
        return U256::ZERO;
    }
    let scaled = (amount * 10f64.powi(decimals as i32)).round();
    if scaled >= u128::MAX as f64 {
        return U256::from(u128::MAX);
    }
    U256::from(scaled as u128)
}

/// Raw payment-token amount committing to `target_usd`
pub fn payment_amount(target_usd: f64, payment_decimals: u8) -> U256 {
    to_units(target_usd, payment_decimals)
}

/// Format a USD amount as `$1,234.56`
pub fn format_usd(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${}.{:02}", if negative { "-" } else { "" }, grouped, cents % 100)
}

/// Share of the target reached, capped at 100
pub fn progress_percent(allocated_usd: f64, target_usd: f64) -> f64 {
    if target_usd <= 0.0 {
        return 100.0;
    }
    (allocated_usd / target_usd * 100.0).clamp(0.0, 100.0)
}

/// Format an address for display (truncated)
pub fn format_address(address: &Address) -> String {
    let s = address.to_checksum(None);
    format!("{}...{}", &s[..6], &s[s.len() - 4..])
}

/// `0x`-prefixed hex of the first `bytes` bytes of `data`
pub fn hex_prefix(data: &[u8], bytes: usize) -> String {
    hex::encode_prefixed(&data[..data.len().min(bytes)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usd_formatting_groups_thousands() {
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(999.999), "$1,000.00");
        assert_eq!(format_usd(1234567.5), "$1,234,567.50");
        assert_eq!(format_usd(-12.3), "-$12.30");
    }

    #[test]
    fn unit_conversions() {
        assert_eq!(from_units(U256::from(150_000_000u64), 8), 1.5);
        assert_eq!(payment_amount(1000.0, 6), U256::from(1_000_000_000u64));
        assert_eq!(to_units(-3.0, 6), U256::ZERO);
    }

    #[test]
    fn progress_is_capped() {
        assert_eq!(progress_percent(1500.0, 1000.0), 100.0);
        assert_eq!(progress_percent(250.0, 1000.0), 25.0);
        assert_eq!(progress_percent(5.0, 0.0), 100.0);
    }

    #[test]
    fn address_display_is_shortened() {
        let address = Address::repeat_byte(0xab);
        let full = address.to_checksum(None);
        let short = format_address(&address);

        assert_eq!(short.len(), 13);
        assert!(short.starts_with(&full[..6]));
        assert!(short.ends_with(&full[38..]));
    }
}
