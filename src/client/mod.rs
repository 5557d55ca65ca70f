//! HTTP access to the ticketing REST API.

pub mod error;
pub mod page;

mod customer;
mod order;
mod ticket;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{
    cookie::{CookieStore as _, Jar},
    header::AUTHORIZATION,
    Method, RequestBuilder,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::{
    api::{self, Customer, JoinedTicket, Order, Ticket},
    config, join,
};

pub use self::{error::Error, page::Page};

/// Cookie carrying the anti-forgery token.
const CSRF_COOKIE: &str = "csrftoken";

/// Header the anti-forgery token is echoed in.
const CSRF_HEADER: &str = "X-CSRFToken";

pub struct Client {
    inner: reqwest::Client,
    base_url: Url,
    cookies: Arc<Jar>,
    bearer_token: Option<String>,
}

impl Client {
    pub fn new(api: &config::Api, auth: &config::Auth) -> Result<Self, Error> {
        let cookies = Arc::new(Jar::default());
        for cookie in &auth.cookies {
            cookies.add_cookie_str(cookie, &api.base_url);
        }

        let inner = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .timeout(api.timeout)
            .build()?;

        Ok(Self {
            inner,
            base_url: api.base_url.clone(),
            cookies,
            bearer_token: auth.bearer_token().map(str::to_owned),
        })
    }

    pub fn from_config(config: &config::Config) -> Result<Self, Error> {
        Self::new(&config.api, &config.auth)
    }

    /// Absolute URL of an API path such as `/api/tickets/`.
    pub fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let csrf_token = self.csrf_token(&url);

        let mut req = self.inner.request(method, url);
        if let Some(token) = &self.bearer_token {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(csrf_token) = csrf_token {
            req = req.header(CSRF_HEADER, csrf_token);
        }
        req
    }

    fn csrf_token(&self, url: &Url) -> Option<String> {
        let cookies = self.cookies.cookies(url)?;
        cookies
            .to_str()
            .ok()?
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == CSRF_COOKIE)
            .map(|(_, value)| value.to_owned())
    }

    /// Walks a listing from `url` to its last page and returns every item in
    /// server order.
    ///
    /// Fails as a whole if any page fails; items of earlier pages are
    /// discarded.
    pub async fn fetch_all<T>(&self, url: Url) -> Result<Vec<T>, Error>
    where
        T: DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut next = Some(url);

        while let Some(url) = next.take() {
            let res = self.request(Method::GET, url.clone()).send().await?;
            let status = res.status();
            if !status.is_success() {
                return Err(Error::FetchAborted { url, status });
            }

            let Some(page) = Page::classify(res.json::<Value>().await?) else {
                debug!(%url, "unsupported listing shape, stopping");
                break;
            };
            let (values, cursor) = page.into_parts();
            debug!(%url, count = values.len(), "fetched page");

            for value in values {
                let item = serde_json::from_value(value).map_err(|source| {
                    Error::Decode {
                        url: url.clone(),
                        source,
                    }
                })?;
                items.push(item);
            }

            next = cursor.map(|cursor| url.join(&cursor)).transpose()?;
        }

        Ok(items)
    }
}

/// Operations the status board needs from the API.
#[async_trait]
pub trait Backend: Sync {
    async fn list_tickets(&self) -> Result<Vec<Ticket>, Error>;

    async fn list_orders(&self) -> Result<Vec<Order>, Error>;

    async fn list_customers(&self) -> Result<Vec<Customer>, Error>;

    /// Changes the status of exactly one ticket. Returns the updated ticket
    /// when the response body can be read as one.
    async fn update_ticket_status(
        &self,
        id: api::ticket::Id,
        status: &str,
    ) -> Result<Option<Ticket>, Error>;
}

#[async_trait]
impl Backend for Client {
    async fn list_tickets(&self) -> Result<Vec<Ticket>, Error> {
        Client::list_tickets(self).await
    }

    async fn list_orders(&self) -> Result<Vec<Order>, Error> {
        Client::list_orders(self).await
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, Error> {
        Client::list_customers(self).await
    }

    async fn update_ticket_status(
        &self,
        id: api::ticket::Id,
        status: &str,
    ) -> Result<Option<Ticket>, Error> {
        Client::update_ticket_status(self, id, status).await
    }
}

/// Fetches tickets, orders and customers concurrently and joins them.
pub async fn load_snapshot<B>(backend: &B) -> Result<Vec<JoinedTicket>, Error>
where
    B: Backend + ?Sized,
{
    let (tickets, orders, customers) = tokio::try_join!(
        backend.list_tickets(),
        backend.list_orders(),
        backend.list_customers(),
    )?;
    debug!(
        tickets = tickets.len(),
        orders = orders.len(),
        customers = customers.len(),
        "loaded snapshot"
    );

    Ok(join::join(tickets, &orders, &customers))
}
