use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config::CURRENCY_PREFIX;

/// `1234567` → `"1,234,567"`.
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Income headline: whole rupiah (fraction truncated), comma-grouped.
pub fn rupiah(amount: Decimal) -> String {
    let whole = amount.trunc().to_i64().unwrap_or(i64::MAX);
    format!("{CURRENCY_PREFIX} {}", group_thousands(whole))
}

/// Tick label for a money axis.
pub fn axis_amount(v: f64) -> String {
    group_thousands(v.round() as i64)
}

/// Plot coordinate for a money value.
pub fn to_plot(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}
