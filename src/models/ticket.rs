use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a parking ticket. Transitions only move forward:
/// `Active -> Exited -> Paid`, with `Paid` terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketStatus {
    Active,
    Exited,
    Paid,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Active => "ACTIVE",
            TicketStatus::Exited => "EXITED",
            TicketStatus::Paid => "PAID",
        }
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(TicketStatus::Active),
            "EXITED" => Ok(TicketStatus::Exited),
            "PAID" => Ok(TicketStatus::Paid),
            other => Err(format!("unknown ticket status '{other}'")),
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: Uuid,
    /// Normalized plate (trimmed, uppercase).
    pub license_plate: String,
    pub parking_lot: String,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub charge: Option<Decimal>,
    pub currency: Option<String>,
    pub transaction_id: Option<String>,
    pub status: TicketStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_wire_strings() {
        for status in [TicketStatus::Active, TicketStatus::Exited, TicketStatus::Paid] {
            assert_eq!(status.as_str().parse::<TicketStatus>(), Ok(status));
        }
        assert!("active".parse::<TicketStatus>().is_err());
    }
}
