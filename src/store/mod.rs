use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Ticket, TicketStatus};

pub mod memory;
pub mod postgres;

pub use memory::MemoryTicketStore;
pub use postgres::PgTicketStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("corrupt ticket record: {0}")]
    Corrupt(String),
}

/// Fields written by a conditional status transition. Absent fields keep
/// their stored value.
#[derive(Debug, Clone)]
pub struct TicketUpdate {
    pub status: TicketStatus,
    pub exit_time: Option<DateTime<Utc>>,
    pub charge: Option<Decimal>,
    pub currency: Option<String>,
    pub transaction_id: Option<String>,
}

impl TicketUpdate {
    /// The ACTIVE -> EXITED transition: records exit time and charge.
    pub fn exited(exit_time: DateTime<Utc>, charge: Decimal) -> Self {
        Self {
            status: TicketStatus::Exited,
            exit_time: Some(exit_time),
            charge: Some(charge),
            currency: None,
            transaction_id: None,
        }
    }

    /// The EXITED -> PAID transition: records currency and transaction id.
    pub fn paid(currency: String, transaction_id: String) -> Self {
        Self {
            status: TicketStatus::Paid,
            exit_time: None,
            charge: None,
            currency: Some(currency),
            transaction_id: Some(transaction_id),
        }
    }
}

/// Narrow persistence interface the lifecycle depends on: a key-value view
/// of tickets keyed by id, with a secondary lookup of the current ACTIVE
/// ticket by plate. Implementations must keep each operation atomic under
/// concurrent callers; the lifecycle adds no locking of its own.
#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn get(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StoreError>;

    /// Insert the ticket unless its plate already has an ACTIVE ticket (or
    /// the id is taken). Returns whether the insert happened; the check and
    /// the write are a single atomic step.
    async fn put_if_absent(&self, ticket: Ticket) -> Result<bool, StoreError>;

    /// Compare-and-swap on status: apply `update` only while the stored
    /// status equals `expected`. Returns the updated ticket, or `None` when
    /// the record is missing or the precondition failed.
    async fn update_if_status(
        &self,
        ticket_id: Uuid,
        expected: TicketStatus,
        update: TicketUpdate,
    ) -> Result<Option<Ticket>, StoreError>;

    async fn find_active_by_plate(&self, plate: &str) -> Result<Option<Ticket>, StoreError>;
}
