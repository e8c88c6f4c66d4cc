use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

const SECONDS_PER_DAY: i64 = 86_400;

/// Pricing configuration for a lot. Injectable so lots can carry their own
/// rates without touching the lifecycle logic.
#[derive(Debug, Clone)]
pub struct RateTable {
    /// Billing block size in minutes.
    pub block_minutes: u32,
    /// Price of one block.
    pub block_rate: Decimal,
    /// ISO currency code attached to payments.
    pub currency: String,
    /// Optional cap on what a single 24h period may cost.
    pub daily_cap: Option<Decimal>,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            block_minutes: 15,
            block_rate: Decimal::new(250, 2),
            currency: "USD".to_string(),
            daily_cap: None,
        }
    }
}

/// Compute the charge for a stay from `entry_time` to `exit_time`.
///
/// The first block is always charged in full, even for a zero-length stay;
/// partial blocks beyond the first are rounded up. With a daily cap, each
/// complete 24h period costs exactly the cap and the remainder is capped
/// too.
///
/// `exit_time >= entry_time` is the caller's responsibility.
pub fn compute_charge(
    entry_time: DateTime<Utc>,
    exit_time: DateTime<Utc>,
    rates: &RateTable,
) -> Decimal {
    debug_assert!(exit_time >= entry_time, "exit before entry");
    let seconds = (exit_time - entry_time).num_seconds().max(0);
    let block_seconds = i64::from(rates.block_minutes) * 60;

    match rates.daily_cap {
        None => {
            let blocks = ceil_div(seconds, block_seconds).max(1);
            rates.block_rate * Decimal::from(blocks)
        }
        Some(cap) => {
            let full_days = seconds / SECONDS_PER_DAY;
            let remainder = seconds % SECONDS_PER_DAY;
            let mut remainder_blocks = ceil_div(remainder, block_seconds);
            if full_days == 0 {
                remainder_blocks = remainder_blocks.max(1);
            }
            let remainder_charge = (rates.block_rate * Decimal::from(remainder_blocks)).min(cap);
            Decimal::from(full_days) * cap + remainder_charge
        }
    }
}

/// Whole minutes parked, rounded to two decimal places, as reported in the
/// exit summary.
pub fn parked_minutes(entry_time: DateTime<Utc>, exit_time: DateTime<Utc>) -> f64 {
    let seconds = (exit_time - entry_time).num_seconds().max(0);
    (seconds as f64 / 60.0 * 100.0).round() / 100.0
}

fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    (numerator + denominator - 1) / denominator
}
