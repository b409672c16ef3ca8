//! Contracts and in-memory services shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use courier::prelude::*;
use courier::middleware::PipelineBuilder;
use serde::{Deserialize, Serialize};

pub const SOLD_OUT: Uuid = Uuid::from_u128(0xdead);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub product_id: Uuid,
    pub qty: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub author: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, courier::RouteArg)]
pub struct OrderFilter {
    pub min_qty: Option<i32>,
    #[courier(rename = "product")]
    pub product_id: Option<Uuid>,
}

#[derive(Debug, thiserror::Error)]
#[error("product {0} is sold out")]
pub struct OutOfStock(pub Uuid);

#[courier::contract]
pub trait Orders {
    async fn get(&self) -> Result<Vec<Order>, CourierError>;

    #[put]
    #[route("addorder/{productId}/{qty}")]
    async fn add_order(&self, product_id: Uuid, qty: i32) -> Result<Order, CourierError>;

    async fn search(&self, filter: OrderFilter) -> Result<Vec<Order>, CourierError>;

    #[name = "Find"]
    async fn find_all(&self) -> Result<Vec<Order>, CourierError>;

    #[name = "Find"]
    #[route("find/{productId}")]
    async fn find_product(&self, product_id: Uuid) -> Result<Vec<Order>, CourierError>;

    async fn post_note(&self, #[body] note: Note) -> Result<(), CourierError>;

    async fn notes(&self) -> Result<Vec<Note>, CourierError>;

    async fn delete_all(&self) -> Result<u32, CourierError>;

    async fn token(&self) -> Result<String, CourierError>;
}

#[courier::contract(prefix = "catalog")]
pub trait Catalog {
    async fn get(&self) -> Result<Vec<String>, CourierError>;
}

#[courier::contract(prefix = "gateway")]
pub trait Gateway {
    #[put]
    async fn place(&self, product_id: Uuid, qty: i32) -> Result<Order, CourierError>;

    async fn orders_token(&self) -> Result<String, CourierError>;
}

#[derive(Default)]
pub struct MemoryOrders {
    orders: Mutex<Vec<Order>>,
    notes: Mutex<Vec<Note>>,
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl Orders for MemoryOrders {
    async fn get(&self) -> Result<Vec<Order>, CourierError> {
        Ok(lock(&self.orders).clone())
    }

    async fn add_order(&self, product_id: Uuid, qty: i32) -> Result<Order, CourierError> {
        if product_id == SOLD_OUT {
            return Err(CourierError::invocation(&OutOfStock(product_id)));
        }
        let order = Order { product_id, qty };
        lock(&self.orders).push(order.clone());
        Ok(order)
    }

    async fn search(&self, filter: OrderFilter) -> Result<Vec<Order>, CourierError> {
        Ok(lock(&self.orders)
            .iter()
            .filter(|o| filter.min_qty.map_or(true, |min| o.qty >= min))
            .filter(|o| filter.product_id.map_or(true, |id| o.product_id == id))
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<Order>, CourierError> {
        self.get().await
    }

    async fn find_product(&self, product_id: Uuid) -> Result<Vec<Order>, CourierError> {
        Ok(lock(&self.orders)
            .iter()
            .filter(|o| o.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn post_note(&self, note: Note) -> Result<(), CourierError> {
        lock(&self.notes).push(note);
        Ok(())
    }

    async fn notes(&self) -> Result<Vec<Note>, CourierError> {
        Ok(lock(&self.notes).clone())
    }

    async fn delete_all(&self) -> Result<u32, CourierError> {
        let mut orders = lock(&self.orders);
        let count = u32::try_from(orders.len()).unwrap_or(u32::MAX);
        orders.clear();
        Ok(count)
    }

    async fn token(&self) -> Result<String, CourierError> {
        Ok(RequestScope::current()
            .and_then(|scope| scope.correlation_token)
            .unwrap_or_default())
    }
}

/// Forwards to a remote `Orders`.
pub struct Forwarding {
    pub orders: Arc<dyn Orders>,
}

#[async_trait]
impl Gateway for Forwarding {
    async fn place(&self, product_id: Uuid, qty: i32) -> Result<Order, CourierError> {
        self.orders.add_order(product_id, qty).await
    }

    async fn orders_token(&self) -> Result<String, CourierError> {
        self.orders.token().await
    }
}

pub fn base() -> PipelineBuilder {
    Pipeline::builder().stage(CorrelationTokenMiddleware::new())
}

/// An `Orders` service mounted under `/api`.
pub fn orders_pipeline(orders: Arc<MemoryOrders>) -> Pipeline {
    let orders: Arc<dyn Orders> = orders;
    install_endpoint::<dyn Orders>(base(), Some("api"), Resolver::instance(orders)).build()
}
