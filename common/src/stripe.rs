use std::collections::HashMap;

use stripe::{Client, CreateCustomer, Customer, CustomerId};
use uuid::Uuid;

use crate::error::{AppError, Res};

pub fn create_client(secret_key: &str) -> Client {
    Client::new(secret_key)
}

/// Creates a Stripe customer tagged with the owning user's id.
pub async fn create_customer(client: &Client, user_id: Uuid, email: Option<&str>) -> Res<Customer> {
    let metadata = HashMap::from([("user_id".to_string(), user_id.to_string())]);
    let params = CreateCustomer {
        email,
        metadata: Some(metadata),
        ..Default::default()
    };

    Customer::create(client, params)
        .await
        .map_err(AppError::from)
}

pub fn parse_customer_id(customer_id: &str) -> Res<CustomerId> {
    customer_id.parse::<CustomerId>().map_err(|e| {
        AppError::Internal(format!(
            "Failed to parse customer id: {}. {}",
            customer_id, e
        ))
    })
}
