pub mod plate;
pub mod ticket;

pub use plate::LicensePlate;
pub use ticket::{Ticket, TicketStatus};
