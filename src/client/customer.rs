use crate::api::Customer;

use super::{Client, Error};

const CUSTOMERS: &str = "/api/customers/";

impl Client {
    pub async fn list_customers(&self) -> Result<Vec<Customer>, Error> {
        self.fetch_all(self.endpoint(CUSTOMERS)?).await
    }
}
