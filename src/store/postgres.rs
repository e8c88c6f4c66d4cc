use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{Ticket, TicketStatus};
use crate::store::{StoreError, TicketStore, TicketUpdate};

const TICKET_COLUMNS: &str = "ticket_id, license_plate, parking_lot, entry_time, exit_time, \
     charge, currency, transaction_id, status";

/// Postgres-backed ticket store.
///
/// Conditional semantics come from the database itself: the partial unique
/// index on `(license_plate) WHERE status = 'ACTIVE'` makes `put_if_absent`
/// an atomic insert-if-not-parked, and `update_if_status` is a single
/// `UPDATE .. WHERE status = $expected`. No application-level locking.
#[derive(Debug, Clone)]
pub struct PgTicketStore {
    pool: PgPool,
}

impl PgTicketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TicketRow {
    ticket_id: Uuid,
    license_plate: String,
    parking_lot: String,
    entry_time: DateTime<Utc>,
    exit_time: Option<DateTime<Utc>>,
    charge: Option<Decimal>,
    currency: Option<String>,
    transaction_id: Option<String>,
    status: String,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = StoreError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<TicketStatus>().map_err(StoreError::Corrupt)?;
        Ok(Ticket {
            ticket_id: row.ticket_id,
            license_plate: row.license_plate,
            parking_lot: row.parking_lot,
            entry_time: row.entry_time,
            exit_time: row.exit_time,
            charge: row.charge,
            currency: row.currency,
            transaction_id: row.transaction_id,
            status,
        })
    }
}

#[async_trait]
impl TicketStore for PgTicketStore {
    async fn get(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StoreError> {
        let query = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE ticket_id = $1");
        let row: Option<TicketRow> = sqlx::query_as(&query)
            .bind(ticket_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Ticket::try_from).transpose()
    }

    async fn put_if_absent(&self, ticket: Ticket) -> Result<bool, StoreError> {
        // ON CONFLICT DO NOTHING also swallows a clash on the partial
        // unique active-plate index, so a lost entry race reports false
        // instead of erroring.
        let result = sqlx::query(
            "INSERT INTO tickets \
                 (ticket_id, license_plate, parking_lot, entry_time, status) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT DO NOTHING",
        )
        .bind(ticket.ticket_id)
        .bind(&ticket.license_plate)
        .bind(&ticket.parking_lot)
        .bind(ticket.entry_time)
        .bind(ticket.status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn update_if_status(
        &self,
        ticket_id: Uuid,
        expected: TicketStatus,
        update: TicketUpdate,
    ) -> Result<Option<Ticket>, StoreError> {
        let query = format!(
            "UPDATE tickets SET \
                 status = $3, \
                 exit_time = COALESCE($4, exit_time), \
                 charge = COALESCE($5, charge), \
                 currency = COALESCE($6, currency), \
                 transaction_id = COALESCE($7, transaction_id) \
             WHERE ticket_id = $1 AND status = $2 \
             RETURNING {TICKET_COLUMNS}"
        );
        let row: Option<TicketRow> = sqlx::query_as(&query)
            .bind(ticket_id)
            .bind(expected.as_str())
            .bind(update.status.as_str())
            .bind(update.exit_time)
            .bind(update.charge)
            .bind(update.currency)
            .bind(update.transaction_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Ticket::try_from).transpose()
    }

    async fn find_active_by_plate(&self, plate: &str) -> Result<Option<Ticket>, StoreError> {
        let query = format!(
            "SELECT {TICKET_COLUMNS} FROM tickets \
             WHERE license_plate = $1 AND status = $2"
        );
        let row: Option<TicketRow> = sqlx::query_as(&query)
            .bind(plate)
            .bind(TicketStatus::Active.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Ticket::try_from).transpose()
    }
}
