//! Resources served by the ticketing REST API.

pub mod customer;
pub mod order;
pub mod reference;
pub mod text;
pub mod ticket;

pub use self::{
    customer::Customer,
    order::Order,
    reference::Reference,
    ticket::{JoinedTicket, Ticket},
};
