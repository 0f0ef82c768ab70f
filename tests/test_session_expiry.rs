use portal::api::{ApiClient, ApiError};
use portal::session::SessionStore;
use reqwest::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

const REFUSAL: &str = r#"{"status":"error","message":"Invalid or expired token"}"#;

fn header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

// reads one whole request, hands its head to the test, answers 401
async fn refuse(mut socket: tokio::net::TcpStream, seen: UnboundedSender<String>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = header_end(&buf) {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                let _ = seen.send(head);
                break;
            }
        }
    }
    let response = format!(
        "HTTP/1.1 401 Unauthorized\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        REFUSAL.len(),
        REFUSAL
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// A backend that refuses every request.
async fn start_backend() -> (String, UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let (seen, requests) = unbounded_channel();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(refuse(socket, seen.clone()));
        }
    });
    (format!("http://{}", address), requests)
}

fn stale_session(name: &str) -> SessionStore {
    let path = std::env::temp_dir().join(format!(
        "portal-expiry-{}-{}.json",
        name,
        std::process::id()
    ));
    let store = SessionStore::new(path);
    store.save("stale-token").unwrap();
    store
}

#[tokio::test]
async fn refused_token_ends_the_session() {
    let (base_url, mut requests) = start_backend().await;
    let store = stale_session("classes");
    let api = ApiClient::new(&base_url, store.clone());
    assert!(api.is_logged_in());

    let err = api.classes().await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
    assert!(!api.is_logged_in());
    assert!(!store.path().exists());
    assert_eq!(store.load().unwrap(), None);

    let request = requests.recv().await.unwrap();
    assert!(request.starts_with("get /academic/classes"));
    assert!(request.contains("authorization: bearer stale-token"));
}

#[tokio::test]
async fn failed_login_keeps_the_session() {
    let (base_url, mut requests) = start_backend().await;
    let store = stale_session("login");
    let api = ApiClient::new(&base_url, store.clone());

    let err = api
        .login("teacher@school.example", "wrong")
        .await
        .unwrap_err();

    match err {
        ApiError::Validation { status, message } => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(message, "Invalid or expired token");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(api.is_logged_in());
    assert!(store.path().exists());
    assert!(requests.recv().await.unwrap().starts_with("post /auth/login"));

    store.clear().unwrap();
}
