use httpmock::prelude::*;
use landed_cost::adapters::freight::FreightSettings;
use landed_cost::domain::model::PackageDescriptor;
use landed_cost::domain::ports::FreightQuoter;
use landed_cost::{LandedCostError, ShipsmartClient};
use serde_json::json;

fn settings(endpoint: String) -> FreightSettings {
    FreightSettings {
        endpoint,
        api_key: "test-key".to_string(),
        timeout_seconds: Some(5),
        ..FreightSettings::default()
    }
}

fn boxes(count: usize) -> Vec<PackageDescriptor> {
    (1..=count)
        .map(|i| PackageDescriptor {
            name: format!("Box {}", i),
            height: 40.0,
            width: 40.0,
            depth: 40.0,
            weight: 32.0,
            declared_value: 3200.0,
        })
        .collect()
}

#[tokio::test]
async fn test_cheapest_carrier_is_selected() {
    let server = MockServer::start_async().await;
    let quote_mock = server.mock_async(|when, then| {
        when.method(POST)
            .path("/v2/quotation")
            .header("Authorization", "Bearer test-key")
            .json_body_partial(r#"{"object": "not_doc", "currency_quote": "USD", "address_receiver": {"country_code": "US"}}"#)
            .body_contains("Box 2");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "data": {
                    "carriers": [
                        {"name": "UPS Worldwide Saver", "currency_payment_amount": "412.80"},
                        {"name": "DHL Express", "currency_payment_amount": 389.15},
                        {"name": "FedEx Economy", "currency_payment_amount": "389.15"}
                    ]
                }
            }));
    }).await;

    let client = ShipsmartClient::new(settings(server.url("/v2/quotation"))).unwrap();
    let quote = client.quote(&boxes(2)).await.unwrap().unwrap();

    quote_mock.assert_async().await;
    assert_eq!(quote.carrier, "DHL Express");
    assert_eq!(quote.price, 389.15);
}

#[tokio::test]
async fn test_error_status_means_no_quote() {
    let server = MockServer::start_async().await;
    let quote_mock = server.mock_async(|when, then| {
        when.method(POST).path("/v2/quotation");
        then.status(401).json_body(json!({"message": "invalid token"}));
    }).await;

    let client = ShipsmartClient::new(settings(server.url("/v2/quotation"))).unwrap();
    let quote = client.quote(&boxes(1)).await.unwrap();

    quote_mock.assert_async().await;
    assert!(quote.is_none());
}

#[tokio::test]
async fn test_malformed_body_means_no_quote() {
    let server = MockServer::start_async().await;
    server.mock_async(|when, then| {
        when.method(POST).path("/v2/quotation");
        then.status(200)
            .header("Content-Type", "text/html")
            .body("<html>maintenance</html>");
    }).await;

    let client = ShipsmartClient::new(settings(server.url("/v2/quotation"))).unwrap();
    assert!(client.quote(&boxes(1)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_empty_carrier_list_means_no_quote() {
    let server = MockServer::start_async().await;
    server.mock_async(|when, then| {
        when.method(POST).path("/v2/quotation");
        then.status(200).json_body(json!({"data": {"carriers": []}}));
    }).await;

    let client = ShipsmartClient::new(settings(server.url("/v2/quotation"))).unwrap();
    assert!(client.quote(&boxes(3)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unreachable_service_means_no_quote() {
    let client = ShipsmartClient::new(settings("http://127.0.0.1:1/v2/quotation".to_string())).unwrap();
    assert!(client.quote(&boxes(1)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_empty_package_list_is_rejected() {
    let client = ShipsmartClient::new(settings("http://127.0.0.1:1/v2/quotation".to_string())).unwrap();
    let result = client.quote(&[]).await;
    assert!(matches!(result, Err(LandedCostError::InvalidInput { .. })));
}
