use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use color_dt::error::FetchError;
use color_dt::poll::{HttpPollSource, PollSource};

/// Serves exactly one canned HTTP response and returns the request line it saw.
async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/screenshot-data/", listener.local_addr().unwrap());

    let task = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = vec![0u8; 4096];
        let n = socket.read(&mut request).await.unwrap();
        let request = String::from_utf8_lossy(&request[..n]).to_string();

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request.lines().next().unwrap_or_default().to_string()
    });

    (url, task)
}

#[tokio::test]
async fn test_fetch_decodes_screenshot_data() {
    let body = r#"{"data":{
        "time":[1700000000000,"2023-11-14T22:13:21Z"],
        "luminance":[50.0,51.5],
        "saturation":[0.2,0.3],
        "chroma":[10.0,11.0],
        "hue":[120.0,121.0],
        "a":[-3.0,-2.5],
        "b":[4.0,4.5],
        "urls":["/static/shots/1.jpg","/static/shots/2.jpg"],
        "uuids":["one","two"]
    }}"#;
    let (url, server) = serve_once("200 OK", body).await;

    let source = HttpPollSource::new(&url, Duration::from_secs(2)).unwrap();
    let payload = source.fetch().await.unwrap();

    assert_eq!(payload.len(), 2);
    assert_eq!(payload.luminance, vec![50.0, 51.5]);
    assert_eq!(payload.uuids.as_deref(), Some(&["one".to_string(), "two".to_string()][..]));

    let columns = payload.into_columns().unwrap();
    assert_eq!(columns.timestamps[1].timestamp(), 1_700_000_001);
    assert_eq!(columns.channel_b, vec![4.0, 4.5]);

    let request_line = server.await.unwrap();
    assert_eq!(request_line, "GET /screenshot-data/ HTTP/1.1");
}

#[tokio::test]
async fn test_server_error_maps_to_status() {
    let (url, server) = serve_once("500 Internal Server Error", "{}").await;

    let source = HttpPollSource::new(&url, Duration::from_secs(2)).unwrap();
    let result = source.fetch().await;

    assert!(matches!(result, Err(FetchError::Status(500))));
    server.await.unwrap();
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let (url, server) = serve_once("200 OK", r#"{"data": "nope"}"#).await;

    let source = HttpPollSource::new(&url, Duration::from_secs(2)).unwrap();
    let result = source.fetch().await;

    assert!(matches!(result, Err(FetchError::Decode(_))));
    server.await.unwrap();
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_error() {
    // bind then drop to get a port nobody is listening on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source = HttpPollSource::new(&format!("http://{}/screenshot-data/", addr), Duration::from_secs(2)).unwrap();
    assert!(matches!(source.fetch().await, Err(FetchError::Transport(_))));
}
