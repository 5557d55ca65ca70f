use crate::api::Order;

use super::{Client, Error};

const ORDERS: &str = "/api/orders/";

impl Client {
    pub async fn list_orders(&self) -> Result<Vec<Order>, Error> {
        self.fetch_all(self.endpoint(ORDERS)?).await
    }
}
