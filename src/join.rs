//! Client-side join of tickets to the email of the customer behind each
//! ticket's order.

use std::collections::HashMap;

use crate::api::{reference, Customer, JoinedTicket, Order, Ticket};

/// Attaches `customer_email` to every ticket.
///
/// The output has exactly one record per input ticket, in input order. A
/// broken link anywhere along ticket -> order -> customer leaves the email
/// empty rather than dropping the ticket.
pub fn join(
    tickets: Vec<Ticket>,
    orders: &[Order],
    customers: &[Customer],
) -> Vec<JoinedTicket> {
    let order_to_customer = orders
        .iter()
        .filter_map(|order| {
            let order_id = reference::normalize(order.id.as_ref())?;
            let customer_id = reference::normalize(order.customer.as_ref())?;
            Some((order_id, customer_id))
        })
        .collect::<HashMap<_, _>>();

    let customer_to_email = customers
        .iter()
        .filter_map(|customer| {
            let customer_id = reference::normalize(customer.id.as_ref())?;
            let email = customer.email.clone().filter(|e| !e.is_empty());
            Some((customer_id, email))
        })
        .collect::<HashMap<_, _>>();

    tickets
        .into_iter()
        .map(|mut ticket| {
            let customer_email = reference::normalize(ticket.order.as_ref())
                .and_then(|order_id| order_to_customer.get(&order_id))
                .and_then(|customer_id| customer_to_email.get(customer_id))
                .cloned()
                .flatten();
            ticket.extra.remove("customer_email");
            JoinedTicket {
                ticket,
                customer_email,
            }
        })
        .collect()
}
