//! Integration tests for the Eastmoney adapter against a local mock server.
//!
//! Covers paging, payload shapes and HTTP status mapping without touching
//! the real endpoint.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use target_common::QuoteProviderConfig;
use target_scanner::data::columns;
use target_scanner::{
    EastmoneyAdapter, IndustryMetrics, MarketSegment, ProviderError, QuoteProvider,
    ValuationEstimator,
};

const CLIST_PATH: &str = "/api/qt/clist/get";
const ULIST_PATH: &str = "/api/qt/ulist.np/get";

fn adapter(server: &MockServer, page_size: u32) -> EastmoneyAdapter {
    EastmoneyAdapter::from_config(&QuoteProviderConfig {
        base_url: server.uri(),
        timeout_secs: 5,
        page_size,
        ..Default::default()
    })
    .unwrap()
}

fn page(total: u64, diff: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "rc": 0,
        "rt": 6,
        "data": { "total": total, "diff": diff }
    }))
}

#[tokio::test]
async fn test_snapshot_follows_pages_until_total() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CLIST_PATH))
        .and(query_param("pn", "1"))
        .and(query_param("pz", "2"))
        .and(query_param("fs", MarketSegment::Beijing.eastmoney_filter()))
        .respond_with(page(
            3,
            json!([
                { "f12": "430047", "f14": "诺思兰德", "f2": 12.5 },
                { "f12": "430090", "f14": "同辉信息", "f2": 3.2 }
            ]),
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(CLIST_PATH))
        .and(query_param("pn", "2"))
        .respond_with(page(3, json!([{ "f12": "832000", "f14": "安徽凤凰", "f2": "-" }])))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = adapter(&server, 2)
        .fetch_snapshot(MarketSegment::Beijing)
        .await
        .unwrap();

    assert_eq!(snapshot.segment, MarketSegment::Beijing);
    assert_eq!(snapshot.len(), 3);
    let codes: Vec<_> = snapshot.rows.iter().filter_map(|r| r.code()).collect();
    assert_eq!(codes, vec!["430047", "430090", "832000"]);
    assert_eq!(
        snapshot.find("832000").unwrap().get(columns::LATEST_PRICE),
        Some(&json!("-"))
    );
}

#[tokio::test]
async fn test_snapshot_stops_on_empty_page() {
    let server = MockServer::start().await;

    // Provider over-reports the total; the second page comes back empty.
    Mock::given(method("GET"))
        .and(path(CLIST_PATH))
        .and(query_param("pn", "1"))
        .respond_with(page(50, json!([{ "f12": "00700", "f2": 380.2 }])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(CLIST_PATH))
        .and(query_param("pn", "2"))
        .respond_with(page(50, json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = adapter(&server, 1)
        .fetch_snapshot(MarketSegment::HongKong)
        .await
        .unwrap();
    assert_eq!(snapshot.len(), 1);
}

#[tokio::test]
async fn test_snapshot_with_null_data_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CLIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "rc": 0, "data": null })))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = adapter(&server, 100)
        .fetch_snapshot(MarketSegment::Shanghai)
        .await
        .unwrap();
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn test_keyed_diff_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CLIST_PATH))
        .respond_with(page(
            2,
            json!({
                "1": { "f12": "000002", "f2": 7.1 },
                "0": { "f12": "000001", "f2": 11.0 }
            }),
        ))
        .mount(&server)
        .await;

    let snapshot = adapter(&server, 100)
        .fetch_snapshot(MarketSegment::Shenzhen)
        .await
        .unwrap();
    let codes: Vec<_> = snapshot.rows.iter().filter_map(|r| r.code()).collect();
    assert_eq!(codes, vec!["000001", "000002"]);
}

#[tokio::test]
async fn test_nonzero_return_code_is_internal_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CLIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "rc": 102, "data": null })))
        .mount(&server)
        .await;

    let err = adapter(&server, 100)
        .fetch_snapshot(MarketSegment::Beijing)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Internal(ref msg) if msg.contains("rc=102")));
    assert!(!err.is_recoverable());
}

#[tokio::test]
async fn test_malformed_body_is_internal_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CLIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = adapter(&server, 100)
        .fetch_snapshot(MarketSegment::Beijing)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Internal(_)));
}

#[tokio::test]
async fn test_rate_limit_maps_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CLIST_PATH))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&server)
        .await;

    let err = adapter(&server, 100)
        .fetch_snapshot(MarketSegment::Beijing)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ProviderError::RateLimited {
            retry_after_secs: Some(30)
        }
    );
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CLIST_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = adapter(&server, 100)
        .fetch_snapshot(MarketSegment::Beijing)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Unavailable(_)));
}

#[tokio::test]
async fn test_client_error_is_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CLIST_PATH))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = adapter(&server, 100)
        .fetch_snapshot(MarketSegment::Beijing)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Network(ref msg) if msg.contains("403")));
}

#[tokio::test]
async fn test_fetch_quote_requests_single_secid() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CLIST_PATH))
        .respond_with(page(0, json!([])))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(ULIST_PATH))
        .and(query_param("secids", "116.03690"))
        .respond_with(page(1, json!([{ "f12": "03690", "f14": "美团-W", "f2": 80.0 }])))
        .expect(1)
        .mount(&server)
        .await;

    let row = adapter(&server, 1)
        .fetch_quote(MarketSegment::HongKong, " 03690 ")
        .await
        .unwrap();
    assert_eq!(row.code(), Some("03690"));
    assert_eq!(row.name(), Some("美团-W"));

    let result = ValuationEstimator::new(IndustryMetrics::default())
        .estimate_row(&row)
        .unwrap();
    assert_eq!(result.current_price, 80.0);
}

#[tokio::test]
async fn test_fetch_quote_rejects_malformed_code_without_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(page(0, json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let adapter = adapter(&server, 100);
    for code in ["", "43004", "ABCDEF", "430047.BJ"] {
        let err = adapter
            .fetch_quote(MarketSegment::Beijing, code)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidRequest(_)), "{:?}", code);
        assert!(!err.is_recoverable());
    }
}

#[tokio::test]
async fn test_fetch_quote_unknown_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ULIST_PATH))
        .and(query_param("secids", "0.999999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "rc": 0, "data": null })))
        .expect(1)
        .mount(&server)
        .await;

    let err = adapter(&server, 100)
        .fetch_quote(MarketSegment::Beijing, "999999")
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::DataNotAvailable(ref msg) if msg.contains("999999")));
}

#[tokio::test]
async fn test_fetch_quote_maps_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ULIST_PATH))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = adapter(&server, 100)
        .fetch_quote(MarketSegment::Shanghai, "600000")
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Unavailable(_)));
}
