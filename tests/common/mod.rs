#![allow(dead_code)]

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use constcat::concat;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net, sync::watch};
use url::Url;

use ticket_status::{
    api::{ticket, Customer, Order, Ticket},
    board::Progress,
    client::{Backend, Error},
    config, Client,
};

const API: &str = "/api";
pub const TICKETS: &str = concat!(API, "/tickets/");
pub const ORDERS: &str = concat!(API, "/orders/");
pub const CUSTOMERS: &str = concat!(API, "/customers/");
const TICKET: &str = concat!(API, "/tickets/:id/");

/// How a mocked listing renders its items.
#[derive(Clone, Debug)]
pub enum Shape {
    /// Bare JSON array.
    Flat,
    /// `results`/`next` envelopes of `size` items, with absolute or
    /// path-only `next` links.
    Paginated { size: usize, relative: bool },
    /// First item only, as a plain object.
    Single,
    /// This exact body, whatever the items are.
    Raw(Value),
}

#[derive(Clone, Debug)]
pub struct Collection {
    pub items: Vec<Value>,
    pub shape: Shape,
    /// 1-based page answered with a server error.
    pub failing_page: Option<usize>,
}

impl Default for Collection {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            shape: Shape::Flat,
            failing_page: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub bearer: Option<String>,
    pub csrf_token: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub tickets: Collection,
    pub orders: Collection,
    pub customers: Collection,
    pub failing_tickets: HashSet<i64>,
    /// Answer successful updates with `204 No Content`.
    pub no_content: bool,
    pub requests: Vec<Recorded>,
    base_url: String,
}

impl MockState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tickets(mut self, items: Vec<Value>, shape: Shape) -> Self {
        self.tickets.items = items;
        self.tickets.shape = shape;
        self
    }

    pub fn orders(mut self, items: Vec<Value>, shape: Shape) -> Self {
        self.orders.items = items;
        self.orders.shape = shape;
        self
    }

    pub fn customers(mut self, items: Vec<Value>, shape: Shape) -> Self {
        self.customers.items = items;
        self.customers.shape = shape;
        self
    }

    pub fn failing_tickets(mut self, ids: &[i64]) -> Self {
        self.failing_tickets.extend(ids);
        self
    }

    pub fn patches(&self) -> Vec<&Recorded> {
        self.requests.iter().filter(|r| r.method == "PATCH").collect()
    }

    pub fn gets(&self, path: &str) -> usize {
        self.requests
            .iter()
            .filter(|r| r.method == "GET" && r.path == path)
            .count()
    }

    fn record(
        &mut self,
        method: &'static str,
        path: String,
        bearer: Option<TypedHeader<Authorization<Bearer>>>,
        headers: &HeaderMap,
        body: Option<Value>,
    ) {
        self.requests.push(Recorded {
            method,
            path,
            bearer: bearer.map(|TypedHeader(Authorization(b))| {
                b.token().to_owned()
            }),
            csrf_token: headers
                .get("x-csrftoken")
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
            body,
        });
    }
}

type SharedState = Arc<Mutex<MockState>>;

/// In-process stand-in for the ticketing REST API.
pub struct MockApi {
    pub base_url: Url,
    state: SharedState,
}

impl MockApi {
    pub async fn start(mut state: MockState) -> Self {
        let listener = net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind");
        let addr = listener.local_addr().expect("no local address");
        let base_url =
            Url::parse(&format!("http://{addr}/")).expect("invalid url");
        state.base_url = base_url.as_str().trim_end_matches('/').to_owned();

        let state = Arc::new(Mutex::new(state));
        let app = Router::new()
            .route(TICKETS, get(list_tickets))
            .route(TICKET, patch(patch_ticket))
            .route(ORDERS, get(list_orders))
            .route(CUSTOMERS, get(list_customers))
            .with_state(Arc::clone(&state));

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server failed");
        });

        Self { base_url, state }
    }

    pub fn client(&self) -> Client {
        self.client_with(config::Auth::default())
    }

    pub fn client_with(&self, auth: config::Auth) -> Client {
        Client::new(&config::Api::new(self.base_url.clone()), &auth)
            .expect("failed to build a client")
    }

    pub fn url(&self, path: &str) -> Url {
        self.base_url.join(path).expect("invalid path")
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("poisoned mock state")
    }
}

#[derive(Deserialize)]
struct PageQuery {
    page: Option<usize>,
}

#[derive(Clone, Copy)]
enum Kind {
    Tickets,
    Orders,
    Customers,
}

async fn list_tickets(
    State(state): State<SharedState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    listing(&state, Kind::Tickets, query, bearer, &headers)
}

async fn list_orders(
    State(state): State<SharedState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    listing(&state, Kind::Orders, query, bearer, &headers)
}

async fn list_customers(
    State(state): State<SharedState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    listing(&state, Kind::Customers, query, bearer, &headers)
}

fn listing(
    state: &SharedState,
    kind: Kind,
    query: PageQuery,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    headers: &HeaderMap,
) -> Response {
    let path = match kind {
        Kind::Tickets => TICKETS,
        Kind::Orders => ORDERS,
        Kind::Customers => CUSTOMERS,
    };
    let page = query.page.unwrap_or(1);

    let mut state = state.lock().expect("poisoned mock state");
    state.record("GET", path.to_owned(), bearer, headers, None);

    let base_url = state.base_url.clone();
    let collection = match kind {
        Kind::Tickets => &state.tickets,
        Kind::Orders => &state.orders,
        Kind::Customers => &state.customers,
    };

    if collection.failing_page == Some(page) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }

    match &collection.shape {
        Shape::Flat => Json(Value::Array(collection.items.clone())),
        Shape::Single => {
            Json(collection.items.first().cloned().unwrap_or(Value::Null))
        }
        Shape::Raw(body) => Json(body.clone()),
        Shape::Paginated { size, relative } => {
            let start = (page - 1) * size;
            let results = collection
                .items
                .iter()
                .skip(start)
                .take(*size)
                .cloned()
                .collect::<Vec<_>>();
            let next = (start + size < collection.items.len()).then(|| {
                let host = if *relative { "" } else { base_url.as_str() };
                format!("{host}{path}?page={}", page + 1)
            });
            Json(json!({
                "count": collection.items.len(),
                "next": next,
                "previous": null,
                "results": results,
            }))
        }
    }
    .into_response()
}

async fn patch_ticket(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("poisoned mock state");
    state.record(
        "PATCH",
        format!("{TICKETS}{id}/"),
        bearer,
        &headers,
        Some(body.clone()),
    );

    if state.failing_tickets.contains(&id) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("ticket {id} is locked"),
        )
            .into_response();
    }
    let no_content = state.no_content;

    let Some(ticket) = state.tickets.items.iter_mut().find(|t| t["id"] == id)
    else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if let Some(status) = body.get("status") {
        ticket["status"] = status.clone();
    }

    if no_content {
        StatusCode::NO_CONTENT.into_response()
    } else {
        Json(ticket.clone()).into_response()
    }
}

pub fn ticket(id: i64, order: Value, status: &str) -> Value {
    json!({
        "id": id,
        "order": order,
        "status": status,
        "passport_name": format!("Passenger {id}"),
    })
}

pub fn parse<T: serde::de::DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).expect("invalid fixture")
}

/// In-memory [`Backend`] that applies updates to its own tickets.
#[derive(Default)]
pub struct FakeBackend {
    pub tickets: Mutex<Vec<Ticket>>,
    pub orders: Vec<Order>,
    pub customers: Vec<Customer>,
    pub failing: HashSet<ticket::Id>,
    pub fail_listings: bool,
    /// Every attempted update with the progress observed when it was sent.
    pub calls: Mutex<Vec<(ticket::Id, String, Option<Progress>)>>,
    pub ticket_listings: Mutex<usize>,
    pub progress: Mutex<Option<watch::Receiver<Progress>>>,
}

impl FakeBackend {
    pub fn new(tickets: Vec<Value>) -> Self {
        Self {
            tickets: Mutex::new(tickets.into_iter().map(parse).collect()),
            ..Self::default()
        }
    }

    pub fn status_of(&self, id: i64) -> Option<String> {
        self.tickets
            .lock()
            .expect("poisoned")
            .iter()
            .find(|t| t.id == ticket::Id::from(id))
            .and_then(|t| t.status.clone())
    }

    pub fn calls(&self) -> Vec<(ticket::Id, String, Option<Progress>)> {
        self.calls.lock().expect("poisoned").clone()
    }

    pub fn ticket_listings(&self) -> usize {
        *self.ticket_listings.lock().expect("poisoned")
    }

    fn unavailable(path: &str) -> Error {
        Error::FetchAborted {
            url: Url::parse("http://fake.invalid/")
                .and_then(|u| u.join(path))
                .expect("invalid url"),
            status: StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_tickets(&self) -> Result<Vec<Ticket>, Error> {
        *self.ticket_listings.lock().expect("poisoned") += 1;
        if self.fail_listings {
            return Err(Self::unavailable(TICKETS));
        }
        Ok(self.tickets.lock().expect("poisoned").clone())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, Error> {
        if self.fail_listings {
            return Err(Self::unavailable(ORDERS));
        }
        Ok(self.orders.clone())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, Error> {
        if self.fail_listings {
            return Err(Self::unavailable(CUSTOMERS));
        }
        Ok(self.customers.clone())
    }

    async fn update_ticket_status(
        &self,
        id: ticket::Id,
        status: &str,
    ) -> Result<Option<Ticket>, Error> {
        let seen = self
            .progress
            .lock()
            .expect("poisoned")
            .as_ref()
            .map(|rx| *rx.borrow());
        self.calls
            .lock()
            .expect("poisoned")
            .push((id, status.to_owned(), seen));

        if self.failing.contains(&id) {
            return Err(Error::RequestFailed {
                id,
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "locked".to_owned(),
            });
        }

        let mut tickets = self.tickets.lock().expect("poisoned");
        let ticket = tickets.iter_mut().find(|t| t.id == id).ok_or(
            Error::RequestFailed {
                id,
                status: StatusCode::NOT_FOUND,
                body: String::new(),
            },
        )?;
        ticket.status = Some(status.to_owned());
        Ok(Some(ticket.clone()))
    }
}
