/// HTTP client tests.
///
/// Each test starts a throwaway `tiny_http` server on an ephemeral loopback
/// port that answers every request with one canned status and body.
use std::thread;

use stockdash::api::{ApiClient, DashboardApi, Endpoint, FetchError, Reply};
use tiny_http::{Header, Response, Server, StatusCode};

/// Serve `body` with `status` for up to `requests` requests; returns the
/// base URL.
fn fake_backend(status: u16, body: &'static str, requests: usize) -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    thread::spawn(move || {
        for request in server.incoming_requests().take(requests) {
            let header =
                Header::from_bytes("Content-Type", "application/json; charset=utf-8").unwrap();
            let resp = Response::from_string(body)
                .with_header(header)
                .with_status_code(StatusCode(status));
            let _ = request.respond(resp);
        }
    });
    format!("http://{addr}")
}

#[test]
fn success_body_decodes_into_data() {
    let url = fake_backend(
        200,
        r#"{"accuracy": 0.61, "precision": 0.58, "total_trades": 150,
            "avg_stock_return": 14.2, "avg_market_return": 9.9, "outperformance": 4.3}"#,
        1,
    );
    let client = ApiClient::new(&url);
    match client.backtest().unwrap() {
        Reply::Data(r) => {
            assert_eq!(r.total_trades, 150);
            assert!((r.accuracy - 0.61).abs() < 1e-9);
        }
        Reply::Failed(msg) => panic!("unexpected service error: {msg}"),
    }
}

#[test]
fn error_field_decodes_into_failed() {
    let url = fake_backend(200, r#"{"error": "Model not trained"}"#, 1);
    let client = ApiClient::new(&url);
    assert_eq!(
        client.predict().unwrap(),
        Reply::Failed("Model not trained".to_string())
    );
}

#[test]
fn server_error_status_is_network_error() {
    // The body's error field is discarded for non-2xx responses.
    let url = fake_backend(500, r#"{"error": "keystats.csv not found"}"#, 1);
    let client = ApiClient::new(&url);
    let err = client.feature_importance().unwrap_err();
    assert_eq!(err, FetchError::Network { status: 500 });
    assert_eq!(err.to_string(), "Network response was not ok");
}

#[test]
fn malformed_body_is_parse_error() {
    let url = fake_backend(200, "<html>oops</html>", 1);
    let client = ApiClient::new(&url);
    assert!(matches!(
        client.dataset_info(),
        Err(FetchError::Parse(_))
    ));
}

#[test]
fn raw_fetch_returns_json_value() {
    let url = fake_backend(200, r#"{"features": []}"#, 1);
    let client = ApiClient::new(&url);
    let value = client.fetch_json(Endpoint::FeatureImportance).unwrap();
    assert_eq!(value["features"], serde_json::json!([]));
}

#[test]
fn error_status_still_counts_as_reachable() {
    let url = fake_backend(503, "{}", 1);
    assert!(ApiClient::new(&url).is_reachable());
}

#[test]
fn closed_port_is_unreachable() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = ApiClient::new(&format!("http://127.0.0.1:{port}"));
    assert!(!client.is_reachable());
    assert!(matches!(
        client.dataset_info(),
        Err(FetchError::Transport(_))
    ));
}
