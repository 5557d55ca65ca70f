//! Ticket status board: the joined ticket table together with the state of
//! single-row edits and bulk status changes.

use itertools::Itertools as _;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    api::{
        ticket::{self, status_matches},
        JoinedTicket, Ticket,
    },
    client::{self, Backend, Error},
};

/// How far a running bulk update has got.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Progress {
    pub updated: usize,
    pub total: usize,
}

#[derive(Debug, Default)]
pub enum BulkState {
    #[default]
    Idle,
    Running(Progress),
    Completed(BulkOutcome),
    Failed { message: String },
}

impl BulkState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }
}

/// Result of a bulk update that ran to the end.
#[derive(Debug)]
pub struct BulkOutcome {
    pub target: String,
    pub updated: usize,
    pub total: usize,
    /// Tickets whose update was rejected, in the order they were tried.
    pub failures: Vec<Failure>,
}

#[derive(Debug)]
pub struct Failure {
    pub id: ticket::Id,
    pub error: Error,
}

pub struct StatusBoard {
    tickets: Vec<JoinedTicket>,
    loading: bool,
    error: Option<String>,
    bulk: BulkState,
    progress: watch::Sender<Progress>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBoard {
    pub fn new() -> Self {
        let (progress, _) = watch::channel(Progress::default());
        Self {
            tickets: Vec::new(),
            loading: false,
            error: None,
            bulk: BulkState::Idle,
            progress,
        }
    }

    pub fn tickets(&self) -> &[JoinedTicket] {
        &self.tickets
    }

    pub fn ticket(&self, id: ticket::Id) -> Option<&JoinedTicket> {
        self.tickets.iter().find(|row| row.ticket.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed load, cleared by the next load.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn bulk(&self) -> &BulkState {
        &self.bulk
    }

    /// Subscribes to bulk update progress. The receiver sees every
    /// successful update as soon as it lands.
    pub fn progress(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    pub fn begin_fetch(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Replaces the table with a freshly joined snapshot. A failed load keeps
    /// the previous rows and records the error for display.
    pub fn apply_fetch_result(
        &mut self,
        result: Result<Vec<JoinedTicket>, Error>,
    ) -> Result<(), Error> {
        self.loading = false;
        match result {
            Ok(tickets) => {
                self.tickets = tickets;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Records a status change the API accepted. The customer email is left
    /// as it was joined.
    pub fn apply_mutation(&mut self, id: ticket::Id, status: &str) {
        self.tickets
            .iter_mut()
            .filter(|row| row.ticket.id == id)
            .for_each(|row| row.ticket.status = Some(status.to_owned()));
    }

    pub fn begin_bulk(&mut self, total: usize) {
        let progress = Progress { updated: 0, total };
        self.bulk = BulkState::Running(progress);
        self.progress.send_replace(progress);
    }

    pub fn advance_bulk(&mut self) {
        if let BulkState::Running(progress) = &mut self.bulk {
            progress.updated += 1;
            self.progress.send_replace(*progress);
        }
    }

    pub fn complete_bulk(&mut self, target: &str, failures: Vec<Failure>) {
        let Progress { updated, total } = match &self.bulk {
            BulkState::Running(progress) => *progress,
            _ => *self.progress.borrow(),
        };
        self.bulk = BulkState::Completed(BulkOutcome {
            target: target.to_owned(),
            updated,
            total,
            failures,
        });
    }

    pub fn fail_bulk(&mut self, message: String) {
        self.bulk = BulkState::Failed { message };
    }

    /// Reloads tickets, orders and customers and rebuilds the table.
    pub async fn refresh<B>(&mut self, backend: &B) -> Result<(), Error>
    where
        B: Backend + ?Sized,
    {
        self.begin_fetch();
        let result = client::load_snapshot(backend).await;
        self.apply_fetch_result(result)
    }

    /// Sets the status of one loaded ticket.
    pub async fn set_status<B>(
        &mut self,
        backend: &B,
        id: ticket::Id,
        status: &str,
    ) -> Result<(), Error>
    where
        B: Backend + ?Sized,
    {
        backend.update_ticket_status(id, status).await?;
        self.apply_mutation(id, status);
        Ok(())
    }

    /// Flips a loaded ticket between pending and received.
    pub async fn toggle_row_status<B>(
        &mut self,
        backend: &B,
        id: ticket::Id,
    ) -> Result<&'static str, Error>
    where
        B: Backend + ?Sized,
    {
        let next = self
            .ticket(id)
            .ok_or(Error::NotLoaded(id))?
            .ticket
            .toggled_status();
        self.set_status(backend, id, next).await?;
        Ok(next)
    }

    /// Moves every ticket not already in `target` status to it.
    ///
    /// Updates are sent one at a time. A rejected update is recorded and
    /// skipped, never retried, and never stops the run. Afterwards the table
    /// is reloaded from the API whatever happened. Only a failure to obtain
    /// the tickets in the first place fails the run.
    pub async fn bulk_update<B>(
        &mut self,
        backend: &B,
        target: &str,
    ) -> &BulkState
    where
        B: Backend + ?Sized,
    {
        let to_update = if self.tickets.is_empty() {
            match backend.list_tickets().await {
                Ok(tickets) => select(&tickets, target),
                Err(e) => {
                    warn!(error = %e, "cannot load tickets for bulk update");
                    self.fail_bulk(e.to_string());
                    return &self.bulk;
                }
            }
        } else {
            select(self.tickets.iter().map(|row| &row.ticket), target)
        };
        self.begin_bulk(to_update.len());
        info!(status = target, total = to_update.len(), "starting bulk update");

        let mut failures = Vec::new();
        for id in to_update {
            match backend.update_ticket_status(id, target).await {
                Ok(_) => self.advance_bulk(),
                Err(error) => {
                    warn!(%id, %error, "skipping ticket");
                    failures.push(Failure { id, error });
                }
            }
        }

        if let Err(e) = self.refresh(backend).await {
            warn!(error = %e, "cannot reload tickets after bulk update");
        }
        self.complete_bulk(target, failures);

        if let BulkState::Completed(outcome) = &self.bulk {
            info!(
                status = target,
                updated = outcome.updated,
                total = outcome.total,
                failed = outcome.failures.len(),
                "bulk update completed"
            );
        }
        &self.bulk
    }
}

/// Ids of the tickets whose status differs from `target`, ignoring case.
fn select<'a>(
    tickets: impl IntoIterator<Item = &'a Ticket>,
    target: &str,
) -> Vec<ticket::Id> {
    tickets
        .into_iter()
        .filter(|t| !status_matches(t.status(), target))
        .map(|t| t.id)
        .collect_vec()
}
