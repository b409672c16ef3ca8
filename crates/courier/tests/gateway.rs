//! Services calling services: scope propagation, redirects and raw HTTP.

mod common;

use std::sync::{Arc, Mutex};

use common::*;
use courier::client::{HttpTransport, OutboundRequest, OutboundResponse, TransportError};
use courier::prelude::*;
use courier_test::{PipelineTransport, TestClient};
use http::header::CONTENT_TYPE;
use http::StatusCode;

/// Remembers the content type and correlation token of every outbound call.
struct Recording {
    inner: Arc<dyn HttpTransport>,
    seen: Mutex<Vec<(String, String)>>,
}

impl Recording {
    fn seen(&self) -> Vec<(String, String)> {
        self.seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl HttpTransport for Recording {
    async fn send(&self, request: OutboundRequest) -> Result<OutboundResponse, TransportError> {
        let header = |name: &str| {
            request
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        let entry = (header(CONTENT_TYPE.as_str()), header("correlation-token"));
        self.seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(entry);
        self.inner.send(request).await
    }
}

/// A gateway pipeline whose `Orders` calls go through `Recording`.
fn gateway() -> (TestClient, Arc<Recording>, Arc<MemoryOrders>) {
    let store = Arc::new(MemoryOrders::default());
    let recording = Arc::new(Recording {
        inner: PipelineTransport::new(orders_pipeline(store.clone())).shared(),
        seen: Mutex::new(Vec::new()),
    });

    let orders = Endpoints::new(recording.clone())
        .with_endpoint::<OrdersClient>(EndpointOptions::new("http://orders/api"))
        .client::<OrdersClient>()
        .unwrap()
        .into_contract();
    let gateway: Arc<dyn Gateway> = Arc::new(Forwarding { orders });

    let pipeline = install_endpoint::<dyn Gateway>(base(), None, Resolver::instance(gateway)).build();
    (TestClient::new(pipeline), recording, store)
}

#[tokio::test]
async fn test_correlation_token_flows_downstream() {
    let (client, recording, _) = gateway();

    let response = client
        .get("/gateway/orderstoken")
        .content_type("application/json")
        .header("Correlation-Token", "chain-1")
        .send()
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    response.assert_header("Correlation-Token", "chain-1");
    assert_eq!(response.json::<String>().unwrap(), "chain-1");
    assert_eq!(recording.seen()[0].1, "chain-1");
}

#[tokio::test]
async fn test_missing_token_is_generated_once_per_chain() {
    let (client, recording, _) = gateway();

    let response = client
        .get("/gateway/orderstoken")
        .content_type("application/json")
        .send()
        .await
        .unwrap();

    let issued = response.header_str("Correlation-Token").unwrap().to_string();
    assert!(Uuid::parse_str(&issued).is_ok());
    assert_eq!(response.json::<String>().unwrap(), issued);
    assert_eq!(recording.seen()[0].1, issued);
}

#[tokio::test]
async fn test_content_type_flows_downstream() {
    let (client, recording, store) = gateway();
    let id = Uuid::new_v4();

    let response = client
        .put(format!("/gateway/place?productId={id}&qty=2"))
        .content_type("application/xml")
        .send()
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.content_type(), Some("application/xml"));
    let order: Order = response.decode().unwrap();
    assert_eq!(order, Order { product_id: id, qty: 2 });

    assert_eq!(recording.seen()[0].0, "application/xml");
    assert_eq!(store.get().await.unwrap(), vec![order]);
}

#[tokio::test]
async fn test_downstream_failure_reaches_the_caller() {
    let (client, _, _) = gateway();

    let response = client
        .put(format!("/gateway/place?productId={SOLD_OUT}&qty=1"))
        .content_type("application/json")
        .send()
        .await
        .unwrap();

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let info = response.exception_info().unwrap();
    assert!(info.r#type.ends_with("OutOfStock"), "{}", info.r#type);
}

#[tokio::test]
async fn test_unsupported_content_type_is_rejected() {
    let client = TestClient::new(orders_pipeline(Arc::new(MemoryOrders::default())));

    let response = client
        .get("/api/get")
        .content_type("text/plain")
        .send()
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.content_type(), Some("application/json"));
    assert!(response.exception_info().unwrap().message.contains("Content-Type"));
}

#[tokio::test]
async fn test_unbindable_argument_is_reported() {
    let client = TestClient::new(orders_pipeline(Arc::new(MemoryOrders::default())));

    let response = client
        .put("/api/addorder/not-a-uuid/1")
        .content_type("application/json")
        .send()
        .await
        .unwrap();

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let info = response.exception_info().unwrap();
    assert_eq!(info.r#type, "ParameterBindingError");
    assert_eq!(info.data_value("parameter"), Some("productId"));
}

#[tokio::test]
async fn test_wrong_verb_falls_through_to_not_found() {
    let client = TestClient::new(orders_pipeline(Arc::new(MemoryOrders::default())));

    let response = client
        .get(format!("/api/addorder/{}/1", Uuid::new_v4()))
        .content_type("application/json")
        .send()
        .await
        .unwrap();

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_remote_contract_is_redirected() {
    let builder = install_endpoint::<dyn Orders>(
        base(),
        Some("api"),
        Resolver::instance(Arc::new(MemoryOrders::default()) as Arc<dyn Orders>),
    );
    let pipeline = install_redirect::<dyn Catalog>(builder, "api", "http://catalog:5002")
        .unwrap()
        .build();
    let client = TestClient::new(pipeline);

    let response = client
        .get("/api/catalog/get")
        .content_type("application/json")
        .send()
        .await
        .unwrap();
    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.location(), Some("http://catalog:5002/catalog/get"));

    let local = client
        .get("/api/get")
        .content_type("application/json")
        .send()
        .await
        .unwrap();
    local.assert_status(StatusCode::OK);

    let unknown = client
        .get("/api/catalog/missing")
        .content_type("application/json")
        .send()
        .await
        .unwrap();
    unknown.assert_status(StatusCode::NOT_FOUND);
}
