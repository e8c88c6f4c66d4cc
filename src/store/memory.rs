use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Ticket, TicketStatus};
use crate::store::{StoreError, TicketStore, TicketUpdate};

/// In-memory ticket store for tests and local development.
///
/// A single lock serializes check-then-insert, which is what makes
/// `put_if_absent` atomic here; the Postgres store gets the same guarantee
/// from its partial unique index instead. Locks are never held across an
/// await.
#[derive(Debug, Default)]
pub struct MemoryTicketStore {
    tickets: RwLock<HashMap<Uuid, Ticket>>,
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn get(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StoreError> {
        let tickets = self.tickets.read().expect("ticket store lock poisoned");
        Ok(tickets.get(&ticket_id).cloned())
    }

    async fn put_if_absent(&self, ticket: Ticket) -> Result<bool, StoreError> {
        let mut tickets = self.tickets.write().expect("ticket store lock poisoned");
        let occupied = tickets.contains_key(&ticket.ticket_id)
            || tickets.values().any(|t| {
                t.license_plate == ticket.license_plate && t.status == TicketStatus::Active
            });
        if occupied {
            return Ok(false);
        }
        tickets.insert(ticket.ticket_id, ticket);
        Ok(true)
    }

    async fn update_if_status(
        &self,
        ticket_id: Uuid,
        expected: TicketStatus,
        update: TicketUpdate,
    ) -> Result<Option<Ticket>, StoreError> {
        let mut tickets = self.tickets.write().expect("ticket store lock poisoned");
        let Some(ticket) = tickets.get_mut(&ticket_id) else {
            return Ok(None);
        };
        if ticket.status != expected {
            return Ok(None);
        }
        ticket.status = update.status;
        if let Some(exit_time) = update.exit_time {
            ticket.exit_time = Some(exit_time);
        }
        if let Some(charge) = update.charge {
            ticket.charge = Some(charge);
        }
        if let Some(currency) = update.currency {
            ticket.currency = Some(currency);
        }
        if let Some(transaction_id) = update.transaction_id {
            ticket.transaction_id = Some(transaction_id);
        }
        Ok(Some(ticket.clone()))
    }

    async fn find_active_by_plate(&self, plate: &str) -> Result<Option<Ticket>, StoreError> {
        let tickets = self.tickets.read().expect("ticket store lock poisoned");
        Ok(tickets
            .values()
            .find(|t| t.license_plate == plate && t.status == TicketStatus::Active)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ticket(plate: &str) -> Ticket {
        Ticket {
            ticket_id: Uuid::new_v4(),
            license_plate: plate.to_string(),
            parking_lot: "L1".to_string(),
            entry_time: Utc::now(),
            exit_time: None,
            charge: None,
            currency: None,
            transaction_id: None,
            status: TicketStatus::Active,
        }
    }

    #[tokio::test]
    async fn put_if_absent_rejects_second_active_ticket_for_plate() {
        let store = MemoryTicketStore::new();
        assert!(store.put_if_absent(ticket("123-12-123")).await.unwrap());
        assert!(!store.put_if_absent(ticket("123-12-123")).await.unwrap());
        assert!(store.put_if_absent(ticket("12-345-67")).await.unwrap());
    }

    #[tokio::test]
    async fn update_if_status_is_a_compare_and_swap() {
        let store = MemoryTicketStore::new();
        let t = ticket("123-12-123");
        let id = t.ticket_id;
        store.put_if_absent(t).await.unwrap();

        let exited = store
            .update_if_status(
                id,
                TicketStatus::Active,
                TicketUpdate::exited(Utc::now(), rust_decimal::Decimal::new(250, 2)),
            )
            .await
            .unwrap();
        assert_eq!(exited.unwrap().status, TicketStatus::Exited);

        // Second swap with a stale expected status must fail.
        let again = store
            .update_if_status(
                id,
                TicketStatus::Active,
                TicketUpdate::exited(Utc::now(), rust_decimal::Decimal::new(250, 2)),
            )
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn update_if_status_on_missing_ticket_returns_none() {
        let store = MemoryTicketStore::new();
        let missing = store
            .update_if_status(
                Uuid::new_v4(),
                TicketStatus::Active,
                TicketUpdate::paid("USD".into(), "tx-test".into()),
            )
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn find_active_by_plate_ignores_closed_tickets() {
        let store = MemoryTicketStore::new();
        let t = ticket("123-12-123");
        let id = t.ticket_id;
        store.put_if_absent(t).await.unwrap();
        assert!(store
            .find_active_by_plate("123-12-123")
            .await
            .unwrap()
            .is_some());

        store
            .update_if_status(
                id,
                TicketStatus::Active,
                TicketUpdate::exited(Utc::now(), rust_decimal::Decimal::new(250, 2)),
            )
            .await
            .unwrap();
        assert!(store
            .find_active_by_plate("123-12-123")
            .await
            .unwrap()
            .is_none());
    }
}
