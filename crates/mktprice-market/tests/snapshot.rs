//! Integration tests for the paged snapshot builders.

use std::time::Duration;

use mktprice_market::{
    build_offer_snapshot, collect_stocks, ClientSettings, MarketClient, SnapshotOptions,
};
use rust_decimal_macros::dec;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> MarketClient {
    let settings = ClientSettings {
        timeout_secs: 5,
        max_attempts: 1,
        retry_delay_ms: 0,
    };
    MarketClient::with_base_url("test-key", settings, base_url)
        .expect("client construction should not fail")
}

fn opts() -> SnapshotOptions {
    SnapshotOptions {
        page_size: 2,
        page_delay: Duration::ZERO,
        limit: None,
    }
}

fn mapping(offer_id: &str, price: serde_json::Value) -> serde_json::Value {
    json!({
        "offer": {
            "offerId": offer_id,
            "name": format!("Offer {offer_id}"),
            "basicPrice": {"value": price, "currencyId": "RUR"},
            "campaigns": [{"campaignId": 1, "status": "PUBLISHED"}]
        },
        "mapping": {"marketCategoryName": "Cables"}
    })
}

fn page(items: &[serde_json::Value], next: Option<&str>) -> ResponseTemplate {
    let mut result = json!({"offerMappings": items});
    if let Some(token) = next {
        result["paging"] = json!({"nextPageToken": token});
    }
    ResponseTemplate::new(200).set_body_json(json!({"status": "OK", "result": result}))
}

async fn mount_two_pages(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/businesses/7/offer-mappings"))
        .and(query_param_is_missing("page_token"))
        .respond_with(page(
            &[mapping("A", json!(50)), mapping("B", json!("n/a"))],
            Some("p2"),
        ))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/businesses/7/offer-mappings"))
        .and(query_param("page_token", "p2"))
        .respond_with(page(&[mapping("C", json!(250.5))], None))
        .mount(server)
        .await;
}

#[tokio::test]
async fn follows_cursor_and_separates_data_issues() {
    let server = MockServer::start().await;
    mount_two_pages(&server).await;

    let client = test_client(&server.uri());
    let snapshot = build_offer_snapshot(&client, 7, 1, &opts(), &CancellationToken::new())
        .await
        .expect("snapshot");

    let ids: Vec<&str> = snapshot.offers.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, ["A", "C"]);
    assert_eq!(snapshot.offers[1].price, dec!(250.5));
    assert_eq!(snapshot.issues.len(), 1);
    assert_eq!(snapshot.issues[0].offer_id, "B");
    assert!(!snapshot.cancelled);
}

#[tokio::test]
async fn limit_stops_paging_early() {
    let server = MockServer::start().await;
    mount_two_pages(&server).await;

    let client = test_client(&server.uri());
    let options = SnapshotOptions {
        limit: Some(2),
        ..opts()
    };
    let snapshot = build_offer_snapshot(&client, 7, 1, &options, &CancellationToken::new())
        .await
        .expect("snapshot");

    assert_eq!(snapshot.offers.len() + snapshot.issues.len(), 2);
    let received = server.received_requests().await.expect("recording enabled");
    assert_eq!(received.len(), 1, "second page must not be requested");
}

#[tokio::test]
async fn cancellation_stops_between_pages() {
    let server = MockServer::start().await;
    mount_two_pages(&server).await;

    let token = CancellationToken::new();
    token.cancel();
    let client = test_client(&server.uri());
    let options = SnapshotOptions {
        page_delay: Duration::from_secs(3600),
        ..opts()
    };
    let snapshot = build_offer_snapshot(&client, 7, 1, &options, &token)
        .await
        .expect("snapshot");

    assert!(snapshot.cancelled);
    assert_eq!(snapshot.offers.len(), 1, "only the first page was read");
}

#[tokio::test]
async fn page_failure_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/businesses/7/offer-mappings"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = build_offer_snapshot(&client, 7, 1, &opts(), &CancellationToken::new()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn collect_stocks_flattens_warehouses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/campaigns/1/offers/stocks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "result": {
                "warehouses": [
                    {
                        "warehouseId": 10,
                        "offers": [{
                            "offerId": "A",
                            "updatedAt": "2024-05-01T10:00:00+03:00",
                            "stocks": [{"type": "FIT", "count": 5}, {"type": "DEFECT", "count": 1}]
                        }]
                    },
                    {
                        "warehouseId": 11,
                        "offers": [{"offerId": "B", "stocks": [{"type": "FIT", "count": 0}]}]
                    }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let snapshot = collect_stocks(&client, 1, &opts(), &CancellationToken::new())
        .await
        .expect("stocks");

    assert_eq!(snapshot.entries.len(), 3);
    assert_eq!(snapshot.entries[0].warehouse_id, 10);
    assert_eq!(snapshot.entries[1].stock_type, "DEFECT");
    assert_eq!(snapshot.entries[2].offer_id, "B");
    assert_eq!(
        snapshot.entries[0].updated_at.as_deref(),
        Some("2024-05-01T10:00:00+03:00")
    );
}
