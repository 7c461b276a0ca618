//! Integer token amounts.
//!
//! Chain amounts routinely exceed what an `f64` can hold exactly (18 decimal
//! places is common), so parsing and rendering stay in `u128` throughout.

use serde::{Deserialize, Serialize};

/// Largest supported number of decimal places; `10^38` would overflow `u128`.
pub const MAX_DECIMALS: u32 = 36;

/// One denominated amount as reported by the bank, staking, or distribution modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    /// Raw decimal string. Distribution rewards carry a fractional part.
    pub amount: String,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }
}

/// Parse an amount string, truncating any fractional remainder toward zero.
///
/// `"123.999"` → `Some(123)`, `"  42 "` → `Some(42)`, `"abc"` → `None`.
pub fn parse_amount(raw: &str) -> Option<u128> {
    let whole = raw.trim().split('.').next().unwrap_or_default();
    if whole.is_empty() {
        // ".5" is a valid decimal with a zero integer part
        return raw.trim().starts_with('.').then_some(0);
    }
    whole.parse::<u128>().ok()
}

/// Sum every entry of `denom`. Unparseable entries are skipped.
pub fn amount_of(coins: &[Coin], denom: &str) -> u128 {
    coins
        .iter()
        .filter(|coin| coin.denom == denom)
        .filter_map(|coin| parse_amount(&coin.amount))
        .fold(0u128, |total, amount| total.saturating_add(amount))
}

/// Render `amount` (in the smallest unit) with two decimal places.
///
/// Rounds half up on the third decimal using integer arithmetic only.
pub fn format_balance(amount: u128, decimals: u32) -> String {
    if amount == 0 {
        return "0.00".to_string();
    }

    let decimals = decimals.min(MAX_DECIMALS);
    // Work in hundredths of a whole unit.
    let hundredths = if decimals >= 2 {
        let divisor = 10u128.pow(decimals - 2);
        let quotient = amount / divisor;
        let remainder = amount % divisor;
        if remainder.saturating_mul(2) >= divisor && divisor > 1 {
            quotient.saturating_add(1)
        } else {
            quotient
        }
    } else {
        amount.saturating_mul(10u128.pow(2 - decimals))
    };

    format!("{}.{:02}", hundredths / 100, hundredths % 100)
}

/// Insert thousands separators: `1234567` → `"1,234,567"`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
