//! The Prometheus exporter installs a process-global recorder, so everything
//! touching it lives in this one test.

use std::net::SocketAddr;
use std::time::Duration;

use emojicalc_telemetry::metrics::record_request;
use emojicalc_telemetry::{init_metrics, MetricsConfig, TelemetryError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

fn free_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

async fn scrape(addr: SocketAddr) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /metrics HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn test_exporter_serves_recorded_requests() {
    let addr = free_addr();
    let config = MetricsConfig {
        addr: addr.to_string(),
        service_name: "calc-test".to_string(),
        ..MetricsConfig::default()
    };
    init_metrics(&config).unwrap();

    record_request("^/?$", 200, Duration::from_millis(3));

    let response = tokio::time::timeout(Duration::from_secs(5), scrape(addr))
        .await
        .expect("exporter should answer");
    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("emojicalc_requests_total"));
    assert!(response.contains(r#"service="calc-test""#));
    assert!(response.contains(r#"status="200""#));

    let again = MetricsConfig {
        addr: free_addr().to_string(),
        ..MetricsConfig::default()
    };
    assert!(matches!(
        init_metrics(&again),
        Err(TelemetryError::MetricsInit(_))
    ));
}
