use reqwest::Method;
use serde::Serialize;
use tracing::debug;

use crate::api::{ticket, Ticket};

use super::{Client, Error};

const TICKETS: &str = "/api/tickets/";

#[derive(Serialize)]
struct StatusPatch<'a> {
    status: &'a str,
}

impl Client {
    pub async fn list_tickets(&self) -> Result<Vec<Ticket>, Error> {
        self.fetch_all(self.endpoint(TICKETS)?).await
    }

    /// Partially updates the `status` of one ticket.
    ///
    /// A success response whose body is not a ticket is still a success,
    /// just without anything to report back.
    pub async fn update_ticket_status(
        &self,
        id: ticket::Id,
        status: &str,
    ) -> Result<Option<Ticket>, Error> {
        let url = self.endpoint(&format!("{TICKETS}{id}/"))?;

        let res = self
            .request(Method::PATCH, url)
            .json(&StatusPatch { status })
            .send()
            .await?;
        let code = res.status();
        if !code.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(Error::RequestFailed {
                id,
                status: code,
                body,
            });
        }
        debug!(%id, status, "updated ticket status");

        let body = res.bytes().await.ok();
        Ok(body.and_then(|body| serde_json::from_slice(&body).ok()))
    }
}
