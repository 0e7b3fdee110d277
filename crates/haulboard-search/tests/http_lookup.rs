//! `HttpLookup` against a one-shot HTTP backend on localhost.

use haulboard_core::{EntityKind, SearchSettings, Session};
use haulboard_search::{HttpLookup, LookupService, QueryController, QueryState};
use std::sync::Once;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Serves exactly one response and hands back the raw request head.
struct Backend {
    base_url: String,
    request: JoinHandle<String>,
}

impl Backend {
    async fn start(status: &'static str, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let request = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut chunk = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&head).into_owned()
        });

        Self {
            base_url: format!("http://{addr}/api"),
            request,
        }
    }

    async fn request(self) -> String {
        tokio::time::timeout(TIMEOUT, self.request)
            .await
            .expect("backend never received a request")
            .unwrap()
    }
}

fn lookup(base_url: &str, token: Option<&str>) -> HttpLookup {
    // A proxy from the environment would swallow localhost requests.
    static NO_PROXY: Once = Once::new();
    NO_PROXY.call_once(|| {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        std::env::set_var("no_proxy", "127.0.0.1,localhost");
    });

    let session = Session::new(base_url, token.map(str::to_string));
    HttpLookup::new(session, TIMEOUT).unwrap()
}

fn header<'a>(request: &'a str, name: &str) -> Option<&'a str> {
    request.lines().skip(1).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim())
    })
}

#[tokio::test]
async fn sends_encoded_query_with_bearer_token() {
    let backend = Backend::start("200 OK", r#"{"results": []}"#).await;
    let lookup = lookup(&backend.base_url, Some("secret-token"));

    let results = lookup.lookup("ram kumar&co").await.unwrap();
    assert!(results.is_empty());

    let request = backend.request().await;
    let request_line = request.lines().next().unwrap();
    assert!(
        request_line.starts_with("GET /api/search?q=ram+kumar%26co "),
        "unexpected request line: {request_line}"
    );
    assert_eq!(
        header(&request, "authorization"),
        Some("Bearer secret-token")
    );
}

#[tokio::test]
async fn anonymous_session_sends_no_authorization() {
    let backend = Backend::start("200 OK", "[]").await;
    let lookup = lookup(&backend.base_url, None);

    lookup.lookup("acme").await.unwrap();

    let request = backend.request().await;
    assert_eq!(header(&request, "authorization"), None);
    assert!(header(&request, "user-agent")
        .unwrap()
        .starts_with("haulboard/"));
}

#[tokio::test]
async fn error_status_surfaces_backend_message() {
    let backend = Backend::start(
        "404 Not Found",
        r#"{"message": "Search endpoint not available"}"#,
    )
    .await;
    let lookup = lookup(&backend.base_url, None);

    let err = lookup.lookup("acme").await.unwrap_err();
    assert_eq!(err.message(), "Search endpoint not available");
    backend.request().await;
}

#[tokio::test]
async fn successful_response_reaches_controller_as_success() {
    let backend = Backend::start(
        "200 OK",
        r#"{"success": true, "data": {"shippers": [{"id": 4, "name": "Acme Freight"}], "truckers": [{"id": 9, "name": "Ravi"}]}}"#,
    )
    .await;
    let settings = SearchSettings {
        debounce: Duration::ZERO,
        cache_results: false,
    };
    let controller = QueryController::new(lookup(&backend.base_url, None), settings);
    let mut rx = controller.subscribe();

    controller.set_query("a");
    let state = tokio::time::timeout(TIMEOUT, async {
        loop {
            let state = rx.borrow_and_update().clone();
            if matches!(state, QueryState::Success(_) | QueryState::Error(_)) {
                return state;
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("lookup never settled");

    let results = state.results();
    assert_eq!(results.len(), 2, "unexpected state: {state:?}");
    assert_eq!(results[0].entity_kind, EntityKind::Shipper);
    assert_eq!(results[0].route(), "/shippers/4");
    assert_eq!(results[1].route(), "/truckers/9");
    backend.request().await;
}
