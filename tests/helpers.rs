// Shared test helpers: a local capturing HTTP server.
//
// The server echoes back what it receives (headers, query string, cookies)
// so tests can assert on the browser's outgoing requests without touching
// the network. It runs on its own thread with a current-thread runtime;
// the blocking browser client stays on the test thread.

use axum::extract::RawQuery;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

/// Starts the capturing test server and returns its base URL.
///
/// Each call binds a fresh ephemeral port; the server thread lives for the
/// rest of the test process.
pub fn start_test_server() -> String {
    let (tx, rx) = std::sync::mpsc::channel();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("Failed to build test server runtime");
        rt.block_on(async move {
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind");
            let addr = listener.local_addr().expect("Failed to get address");
            tx.send(addr).expect("Failed to publish server address");
            axum::serve(listener, test_app())
                .await
                .expect("Test server failed");
        });
    });

    let addr = rx.recv().expect("Test server did not start");
    // Give the accept loop a moment to come up
    std::thread::sleep(std::time::Duration::from_millis(50));
    format!("http://{addr}")
}

fn test_app() -> Router {
    Router::new()
        .route("/", get(front_page))
        .route("/headers", get(echo_headers))
        .route("/query", get(echo_query))
        .route("/login", get(login))
        .route("/whoami", get(whoami))
        .route("/missing", get(missing))
}

async fn front_page() -> Html<&'static str> {
    Html("<html><head><title>Front Page</title></head><body><h1>Welcome</h1></body></html>")
}

/// Echoes the received request headers, one `name: value` line each,
/// with lowercased names (axum folds header names to lowercase).
async fn echo_headers(headers: HeaderMap) -> String {
    let mut lines: Vec<String> = headers
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value.to_str().unwrap_or("")))
        .collect();
    lines.sort();
    lines.join("\n")
}

async fn echo_query(RawQuery(query): RawQuery) -> String {
    query.unwrap_or_default()
}

async fn login() -> impl IntoResponse {
    ([(SET_COOKIE, "session=abc123; Path=/")], "logged in")
}

async fn whoami(headers: HeaderMap) -> String {
    headers
        .get(COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("anonymous")
        .to_string()
}

async fn missing() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "gone")
}
