use std::env;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::billing::RateTable;

pub mod cors;

pub use cors::create_cors_layer;

const DEFAULT_PORT: u16 = 3001;

pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rates: RateTable,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/parkade".to_string()),
            port: env_parsed("PORT").unwrap_or(DEFAULT_PORT),
            rates: rate_table_from_env(),
        }
    }
}

fn rate_table_from_env() -> RateTable {
    let defaults = RateTable::default();
    RateTable {
        block_minutes: env_parsed("BILLING_BLOCK_MINUTES").unwrap_or(defaults.block_minutes),
        block_rate: env_parsed("BILLING_BLOCK_RATE").unwrap_or(defaults.block_rate),
        currency: env::var("BILLING_CURRENCY").unwrap_or(defaults.currency),
        daily_cap: env_parsed::<Decimal>("BILLING_DAILY_CAP").or(defaults.daily_cap),
    }
}

fn env_parsed<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unparseable {name}={raw}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rate_table_matches_reference_pricing() {
        let rates = RateTable::default();
        assert_eq!(rates.block_minutes, 15);
        assert_eq!(rates.block_rate, Decimal::new(250, 2));
        assert_eq!(rates.currency, "USD");
        assert!(rates.daily_cap.is_none());
    }
}
