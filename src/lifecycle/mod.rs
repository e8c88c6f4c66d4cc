use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::billing::{compute_charge, parked_minutes, RateTable};
use crate::models::{LicensePlate, Ticket, TicketStatus};
use crate::store::{TicketStore, TicketUpdate};
use crate::utils::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryReceipt {
    pub ticket_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitSummary {
    pub license_plate: String,
    pub total_parked_time: f64,
    pub parking_lot: String,
    pub charge: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub ticket_id: Uuid,
    pub license_plate: String,
    pub charged: Decimal,
    pub currency: String,
    pub transaction_id: String,
    #[serde(rename = "payment_status")]
    pub payment_status: &'static str,
}

/// Ticket lifecycle manager.
///
/// Stateless between calls; every transition is one read plus one
/// conditional write against the store, so a lost race surfaces as the
/// corresponding conflict instead of overwriting newer state. Conflicts are
/// terminal outcomes, never retried here.
pub struct TicketService {
    store: Arc<dyn TicketStore>,
    rates: RateTable,
}

impl TicketService {
    pub fn new(store: Arc<dyn TicketStore>, rates: RateTable) -> Self {
        Self { store, rates }
    }

    /// Open a ticket for a vehicle entering `parking_lot`.
    pub async fn entry(&self, plate: &str, parking_lot: &str) -> Result<EntryReceipt, AppError> {
        let plate = LicensePlate::parse(plate)?;

        if self.store.find_active_by_plate(plate.as_str()).await?.is_some() {
            return Err(AppError::DuplicateActive(format!(
                "Vehicle with license plate {plate} is already parked"
            )));
        }

        let ticket = Ticket {
            ticket_id: Uuid::new_v4(),
            license_plate: plate.into_inner(),
            parking_lot: parking_lot.to_string(),
            entry_time: Utc::now(),
            exit_time: None,
            charge: None,
            currency: None,
            transaction_id: None,
            status: TicketStatus::Active,
        };
        let ticket_id = ticket.ticket_id;
        let license_plate = ticket.license_plate.clone();

        // The insert re-checks the plate atomically; losing that race is
        // the same conflict as the explicit lookup above.
        if !self.store.put_if_absent(ticket).await? {
            return Err(AppError::DuplicateActive(format!(
                "Vehicle with license plate {license_plate} is already parked"
            )));
        }

        info!(%ticket_id, plate = %license_plate, lot = %parking_lot, "Ticket opened");
        Ok(EntryReceipt { ticket_id })
    }

    /// Close the ticket and compute the charge.
    pub async fn exit(&self, ticket_id: &str) -> Result<ExitSummary, AppError> {
        let id = parse_ticket_id(ticket_id)?;
        let ticket = self.fetch(id, ticket_id).await?;

        match ticket.status {
            TicketStatus::Active => {}
            TicketStatus::Exited => {
                return Err(AppError::AlreadyExited(format!(
                    "Exit request for ticket {ticket_id} was already processed"
                )))
            }
            TicketStatus::Paid => {
                return Err(AppError::AlreadyExited(format!(
                    "Ticket {ticket_id} is already paid"
                )))
            }
        }

        // Clamp so a backwards clock step can never record a negative stay.
        let exit_time = Utc::now().max(ticket.entry_time);
        let charge = compute_charge(ticket.entry_time, exit_time, &self.rates);

        let updated = self
            .store
            .update_if_status(id, TicketStatus::Active, TicketUpdate::exited(exit_time, charge))
            .await?
            .ok_or_else(|| {
                AppError::AlreadyExited(format!(
                    "Exit request for ticket {ticket_id} was already processed"
                ))
            })?;

        info!(%ticket_id, %charge, "Ticket exited");
        Ok(ExitSummary {
            total_parked_time: parked_minutes(updated.entry_time, exit_time),
            license_plate: updated.license_plate,
            parking_lot: updated.parking_lot,
            charge,
        })
    }

    /// Settle the charge on an exited ticket.
    pub async fn pay(&self, ticket_id: &str) -> Result<PaymentReceipt, AppError> {
        let id = parse_ticket_id(ticket_id)?;
        let ticket = self.fetch(id, ticket_id).await?;

        match ticket.status {
            TicketStatus::Paid => {
                return Err(AppError::AlreadyPaid(format!(
                    "Ticket {ticket_id} is already settled"
                )))
            }
            TicketStatus::Active => {
                return Err(AppError::PayBeforeExit(format!(
                    "Ticket {ticket_id} has not exited yet"
                )))
            }
            TicketStatus::Exited => {}
        }

        let transaction_id = format!("tx-{}", Uuid::new_v4());
        let updated = self
            .store
            .update_if_status(
                id,
                TicketStatus::Exited,
                TicketUpdate::paid(self.rates.currency.clone(), transaction_id.clone()),
            )
            .await?
            .ok_or_else(|| {
                AppError::AlreadyPaid(format!("Ticket {ticket_id} is already settled"))
            })?;

        // Exit always records the charge before the status leaves ACTIVE.
        let charged = updated.charge.ok_or_else(|| {
            AppError::InternalServerError(format!("ticket {ticket_id} has no recorded charge"))
        })?;

        info!(%ticket_id, %transaction_id, "Ticket paid");
        Ok(PaymentReceipt {
            ticket_id: updated.ticket_id,
            license_plate: updated.license_plate,
            charged,
            currency: self.rates.currency.clone(),
            transaction_id,
            payment_status: "paid",
        })
    }

    async fn fetch(&self, id: Uuid, raw_id: &str) -> Result<Ticket, AppError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ticket {raw_id} not found")))
    }
}

fn parse_ticket_id(raw: &str) -> Result<Uuid, AppError> {
    // An unparseable id can match no stored ticket, so it reads as unknown
    // rather than malformed.
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound(format!("Ticket {raw} not found")))
}
