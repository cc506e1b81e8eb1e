//! Transport round-trips against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives a `Transport` backed
//! by the real `UreqClient` over HTTP: success, application-level errors,
//! HEAD probes, merged headers, and a refused connection.

use std::net::SocketAddr;

use quaff_core::{
    Auth, CodeSet, EndpointConfig, ErrorResponse, Options, Outcome, RawResponse, Transport,
    TransportConfig,
};
use serde_json::json;

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn transport(endpoint: EndpointConfig) -> Transport<EndpointConfig> {
    let options = Options::from_value(json!({"timeout": 5.0})).unwrap();
    Transport::new(endpoint, options).unwrap()
}

#[test]
fn get_items_is_ok() {
    let addr = start_server();
    let t = transport(EndpointConfig::new(&format!("http://{addr}")));

    let outcome = t.get("/items", &[]).unwrap();
    assert!(outcome.is_ok());
    assert_eq!(outcome.result_code(), 200);

    let response = outcome.response();
    let raw = response.downcast_ref::<RawResponse>().unwrap();
    assert_eq!(raw.meta.content_type, "application/json");

    let items: Vec<mock_server::Item> = response.json().unwrap();
    assert_eq!(items, mock_server::seed());
}

#[test]
fn missing_item_is_an_error_response_not_a_failure() {
    let addr = start_server();
    let ok_codes = CodeSet::from_codes([200, 201, 204]);
    let t = transport(EndpointConfig::new(&format!("http://{addr}")))
        .with_config(TransportConfig::with_ok_codes(ok_codes));

    let outcome = t
        .get("/items/00000000-0000-0000-0000-000000000000", &[])
        .unwrap();
    let Outcome::Error(response) = outcome else {
        panic!("expected an error response");
    };
    let err = response.downcast_ref::<ErrorResponse>().unwrap();
    assert_eq!(err.meta.result_code, 404);
    assert_eq!(err.message(), "Not Found");
}

#[test]
fn server_error_keeps_body_and_content_type() {
    let addr = start_server();
    let t = transport(EndpointConfig::new(&format!("http://{addr}")));

    let outcome = t.get("fail", &[]).unwrap();
    assert!(outcome.is_error());
    let response = outcome.response();
    assert_eq!(response.body(), "boom");
    assert_eq!(response.meta().content_type, "text/plain");
    assert_eq!(
        response.meta().result_message.as_deref(),
        Some("Internal Server Error")
    );
}

#[test]
fn binary_body_is_still_a_response() {
    let addr = start_server();
    let t = transport(EndpointConfig::new(&format!("http://{addr}")));

    let outcome = t.get("/bin", &[]).unwrap();
    let Outcome::Ok(response) = outcome else {
        panic!("expected a success response");
    };
    assert_eq!(response.meta().content_type, "application/octet-stream");
    assert_eq!(response.body(), "\u{FFFD}\u{FFFD}\u{0}\u{1}");
}

#[test]
fn created_is_ok_under_default_codes() {
    let addr = start_server();
    let t = transport(EndpointConfig::new(&format!("http://{addr}")));

    let outcome = t.get("created", &[]).unwrap();
    assert!(outcome.is_ok());
    assert_eq!(outcome.result_code(), 201);
    assert_eq!(outcome.response().body(), "");
}

#[test]
fn merged_headers_and_query_reach_the_server() {
    let addr = start_server();
    let native = Options::from_value(json!({"headers": {"X-Api-Key": "abc"}})).unwrap();
    let endpoint = EndpointConfig::new(&format!("http://{addr}/"))
        .with_accept_type("application/json")
        .with_auth(Auth::Basic {
            username: "aladdin".to_string(),
            password: "opensesame".to_string(),
        })
        .with_query("format", "json")
        .with_native(native);
    let t = transport(endpoint);

    let outcome = t.get("/echo", &[("page", "2")]).unwrap();
    let echo: mock_server::Echo = outcome.response().json().unwrap();

    assert_eq!(echo.query.as_deref(), Some("format=json&page=2"));
    assert_eq!(echo.headers["accept"], vec!["application/json"]);
    assert_eq!(echo.headers["x-api-key"], vec!["abc"]);
    assert_eq!(
        echo.headers["authorization"],
        vec!["Basic YWxhZGRpbjpvcGVuc2VzYW1l"]
    );
}

#[test]
fn ping_existing_and_missing() {
    let addr = start_server();
    let t = transport(EndpointConfig::new(&format!("http://{addr}")));

    let found = t.ping("/items/00000000-0000-0000-0000-000000000001").unwrap();
    assert_eq!(found.status, 200);
    assert!(found.outcome.is_ok());
    assert_eq!(found.outcome.response().body(), "");

    let missing = t.ping("/items/00000000-0000-0000-0000-000000000009").unwrap();
    assert_eq!(missing.status, 404);
    assert!(missing.outcome.is_error());
}

#[test]
fn refused_connection_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let t = transport(EndpointConfig::new(&format!("http://{addr}")));

    let err = t.get("/items", &[]).unwrap_err();
    assert!(err.message().contains("Connection refused"), "{err}");
    assert_ne!(err.code(), 0);
    assert!(std::error::Error::source(&err).is_some());
}
