use std::time::Duration;

use spectrapanel_core::acquisition::{AcquisitionParameters, SensorRequest};
use spectrapanel_core::protocol::{HttpSensorClient, SensorClient, SensorEndpoint, SensorError};
use spectrapanel_core::spectral::ReadingError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve a single canned HTTP response and hand back the request line
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let origin = format!("http://{}/", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        String::from_utf8_lossy(&request)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    });

    (origin, handle)
}

fn client_for(origin: &str) -> HttpSensorClient {
    let endpoint = SensorEndpoint::from_origin(origin).unwrap();
    HttpSensorClient::new(endpoint, Duration::from_secs(5)).unwrap()
}

#[test]
fn test_request_url_for_repeat_read() {
    let endpoint = SensorEndpoint::from_origin("http://192.168.1.40/").unwrap();
    let request = AcquisitionParameters::new(29, 3596, 9, 12).to_request(true);
    assert_eq!(
        endpoint.request_url(&request).as_str(),
        "http://192.168.1.40/as7341?atime=29&astep=3596&gain=9&led_ma=12&led_stay_on=1"
    );
}

#[test]
fn test_origin_with_port() {
    let endpoint = SensorEndpoint::from_origin("http://localhost:8080").unwrap();
    assert_eq!(endpoint.url().as_str(), "http://localhost:8080/as7341");
}

#[test]
fn test_configured_origin_used_outside_development() {
    let endpoint = SensorEndpoint::resolve(false, Some("http://10.1.2.3/")).unwrap();
    assert_eq!(endpoint.url().host_str(), Some("10.1.2.3"));

    let fallback = SensorEndpoint::resolve(false, None).unwrap();
    assert_eq!(fallback, SensorEndpoint::development().unwrap());
}

#[test]
fn test_error_classification() {
    assert!(SensorError::Timeout.is_transport());
    assert!(SensorError::Status(500).is_transport());
    assert!(!SensorError::Decode("eof".into()).is_transport());
    assert!(!SensorError::Reading(ReadingError::NotAnObject).is_transport());
}

#[test]
fn test_json_error_becomes_decode() {
    let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(SensorError::from(err), SensorError::Decode(_)));
}

#[test]
fn test_reading_error_message_passes_through() {
    let err = SensorError::from(ReadingError::MissingChannel("480nm".into()));
    assert_eq!(err.to_string(), ReadingError::MissingChannel("480nm".into()).to_string());
}

#[tokio::test]
async fn test_fetch_reading_over_http() {
    const BODY: &str = concat!(
        r#"{"415nm":1,"445nm":2,"480nm":3,"515nm":4,"#,
        r#""555nm":5,"590nm":6,"630nm":7,"680nm":8,"clear":9}"#,
    );
    let (origin, server) = serve_once("200 OK", BODY).await;
    let client = client_for(&origin);

    let request = AcquisitionParameters::new(0, 3596, 9, 0).to_request(false);
    let raw = client.fetch_reading(&request).await.unwrap();

    assert_eq!(raw.fields().len(), 9);
    assert_eq!(raw.get("clear"), Some(&serde_json::json!(9)));
    assert_eq!(
        server.await.unwrap(),
        "GET /as7341?atime=0&astep=3596&gain=9&led_ma=0 HTTP/1.1"
    );
}

#[tokio::test]
async fn test_http_error_status() {
    let (origin, server) = serve_once("503 Service Unavailable", "busy").await;
    let client = client_for(&origin);

    let err = client
        .fetch_reading(&SensorRequest::LedOff)
        .await
        .unwrap_err();
    assert_eq!(err, SensorError::Status(503));
    server.await.unwrap();
}

#[tokio::test]
async fn test_non_json_body() {
    let (origin, server) = serve_once("200 OK", "<html>sensor</html>").await;
    let client = client_for(&origin);

    let request = AcquisitionParameters::default().to_request(false);
    let err = client.fetch_reading(&request).await.unwrap_err();
    assert!(matches!(err, SensorError::Decode(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn test_json_array_rejected() {
    let (origin, server) = serve_once("200 OK", "[1, 2, 3]").await;
    let client = client_for(&origin);

    let request = AcquisitionParameters::default().to_request(false);
    let err = client.fetch_reading(&request).await.unwrap_err();
    assert_eq!(err, SensorError::Reading(ReadingError::NotAnObject));
    server.await.unwrap();
}

#[tokio::test]
async fn test_led_off_request_ignores_failure() {
    // Nothing listens on this port once the listener is dropped
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let origin = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    client_for(&origin).switch_led_off().await;
}

#[tokio::test]
async fn test_led_off_query() {
    let (origin, server) = serve_once("200 OK", "{}").await;
    client_for(&origin).switch_led_off().await;
    assert_eq!(server.await.unwrap(), "GET /as7341?led_ma=0 HTTP/1.1");
}
