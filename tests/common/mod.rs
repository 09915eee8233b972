//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

use prometheus_csv_discovery::config::{ColumnMapping, HttpOptions, LabelColumn, ParseOptions, SourceConfig, SourceKind};

/// What the mock backend saw.
#[derive(Debug, Clone, Default)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
}

#[allow(dead_code)]
impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Start a programmable backend on an ephemeral port.
///
/// `f` receives the parsed request and returns status and raw body bytes.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(RecordedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, Vec<u8>)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            401 => "401 Unauthorized",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let head = format!(
                            "HTTP/1.1 {}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                            status_text,
                            body.len(),
                        );
                        let _ = socket.write_all(head.as_bytes()).await;
                        let _ = socket.write_all(&body).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a backend that always answers 200 with `body`.
#[allow(dead_code)]
pub async fn start_mock_backend(body: &'static [u8]) -> SocketAddr {
    start_programmable_backend(move |_| async move { (200, body.to_vec()) }).await
}

/// Start an HTTPS backend serving `body` at `/targets.csv`, using a freshly
/// generated self-signed certificate.
#[allow(dead_code)]
pub async fn start_tls_backend(body: &'static str) -> SocketAddr {
    let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string(), "127.0.0.1".to_string()]).unwrap();
    let tls = RustlsConfig::from_pem(cert.cert.pem().into_bytes(), cert.key_pair.serialize_pem().into_bytes())
        .await
        .unwrap();

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new().route("/targets.csv", get(move || async move { body }));
    tokio::spawn(async move {
        let _ = axum_server::from_tcp_rustls(listener, tls)
            .serve(app.into_make_service())
            .await;
    });

    addr
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let text = String::from_utf8_lossy(&buf);
    let mut lines = text.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers = lines
        .take_while(|l| !l.is_empty())
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    Some(RecordedRequest { method, path, headers })
}

/// A source config with target in column 0 and `env` from column 1.
#[allow(dead_code)]
pub fn http_source_config(name: &str, url: &str, options: HttpOptions) -> SourceConfig {
    SourceConfig {
        name: name.to_string(),
        locator: Url::parse(url).unwrap(),
        kind: SourceKind::Http(options),
        mapping: ColumnMapping {
            target_col: 0,
            labels: vec![LabelColumn {
                col: 1,
                label_name: "env".to_string(),
            }],
        },
        parse: ParseOptions {
            delimiter: b',',
            comment_prefix: "#".to_string(),
            strict_columns: false,
        },
    }
}

/// Same mapping as [`http_source_config`] for a local file.
#[allow(dead_code)]
pub fn file_source_config(name: &str, path: &std::path::Path) -> SourceConfig {
    let mut config = http_source_config(name, "file:///unused.csv", HttpOptions::default());
    config.locator = Url::from_file_path(path).unwrap();
    config.kind = SourceKind::File(path.to_path_buf());
    config
}
