use rcgen::CertifiedKey;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio_rustls::rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use tokio_rustls::rustls::{crypto, ServerConfig};
use tokio_rustls::TlsAcceptor;
use vhunter::config::RunConfig;
use vhunter::core::{
    build_client, Enumerator, HttpConfig, HttpProber, Prober, Target, TextDiffComparator,
    USER_AGENT,
};
use vhunter::output::Outcome;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADMIN_PAGE: &str = "<html><head><title>Admin console</title></head><body>\
    <h1>Internal administration</h1><p>Sign in with your corporate account to manage \
    users, billing, audit logs, feature flags and deployment pipelines. Unauthorized \
    access is prohibited and monitored by the security operations team.</p>\
    <form method=post action=/login><input name=user><input name=password type=password>\
    <button>Sign in</button></form><footer>ACME Corp internal tools v4.2</footer></body></html>";

fn prober(headers: Vec<(String, String)>) -> HttpProber {
    let client = build_client(&HttpConfig {
        timeout: Duration::from_secs(5),
        proxy: None,
    })
    .unwrap();
    HttpProber::new(client, headers)
}

fn target_for(server: &MockServer) -> Target {
    let addr = server.address();
    Target::new(addr.ip().to_string(), addr.port(), false)
}

async fn vhost_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("host", "admin"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ADMIN_PAGE))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn host_header_selects_the_vhost() {
    let server = vhost_server().await;
    let prober = prober(Vec::new());
    let target = target_for(&server);

    let admin = prober.probe(&target, "/", "admin").await.unwrap();
    assert_eq!(admin.status, 200);
    assert_eq!(admin.content_length, Some(ADMIN_PAGE.len() as u64));
    assert!(admin.raw_text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(admin.raw_text.ends_with(ADMIN_PAGE));

    let other = prober.probe(&target, "/", "nothing-here").await.unwrap();
    assert_eq!(other.status, 404);
    assert!(other.raw_text.contains("\r\n\r\nNot Found"));
}

#[tokio::test]
async fn requests_carry_user_agent_and_custom_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .and(header("user-agent", USER_AGENT))
        .and(header("x-api-key", "secret"))
        .and(header("host", "intranet.example.com"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let prober = prober(vec![("X-Api-Key".to_string(), "secret".to_string())]);
    let response = prober
        .probe(&target_for(&server), "/status", "intranet.example.com")
        .await
        .unwrap();
    assert_eq!(response.status, 204);
}

#[tokio::test]
async fn redirects_are_not_followed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/login"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("login page"))
        .expect(0)
        .mount(&server)
        .await;

    let response = prober(Vec::new())
        .probe(&target_for(&server), "/", "admin")
        .await
        .unwrap();
    assert_eq!(response.status, 301);
    assert!(response.raw_text.contains("location: /login\r\n"));
}

#[tokio::test]
async fn compressed_encodings_are_not_requested() {
    let server = vhost_server().await;
    prober(Vec::new())
        .probe(&target_for(&server), "/", "admin")
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("accept-encoding"));
}

#[tokio::test]
async fn connection_failures_are_reported() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let target = Target::new("127.0.0.1", port, false);
    let err = prober(Vec::new())
        .probe(&target, "/", "admin")
        .await
        .unwrap_err();
    assert!(!err.reason().is_empty());
}

#[tokio::test]
async fn end_to_end_reports_only_the_real_vhost() {
    let server = vhost_server().await;
    let addr = *server.address();

    let config = Arc::new(RunConfig {
        ips: vec![addr.ip().to_string()],
        ports: vec![addr.port()],
        wordlist: vec!["admin".into(), "api".into(), "www".into()],
        tls: false,
        threads: 2,
        threshold: 0.30,
        verbose: true,
        ..RunConfig::default()
    });

    let enumerator = Enumerator::new(
        Arc::clone(&config),
        Arc::new(prober(Vec::new())),
        Arc::new(TextDiffComparator),
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let stats = enumerator.run(tx).await.unwrap();
    assert_eq!(stats.dispatched, 3);
    assert_eq!(stats.completed, 3);

    let mut found = Vec::new();
    let mut negatives = Vec::new();
    while let Some(event) = rx.recv().await {
        match event.outcome {
            Outcome::Found { status, .. } => {
                assert_eq!(status, 200);
                found.push(event.host);
            }
            Outcome::Indistinct { status, .. } => {
                assert_eq!(status, 404);
                negatives.push(event.host);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    negatives.sort();
    assert_eq!(found, vec!["admin"]);
    assert_eq!(negatives, vec!["api", "www"]);
}

/// Headers a stock nginx in front of an application would send.
fn nginx_page(status: u16, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(status)
        .insert_header("server", "nginx/1.24.0 (Ubuntu)")
        .insert_header("content-type", "text/html; charset=utf-8")
        .insert_header("cache-control", "no-cache, no-store, must-revalidate")
        .insert_header("x-frame-options", "SAMEORIGIN")
        .insert_header("x-content-type-options", "nosniff")
        .insert_header("strict-transport-security", "max-age=31536000; includeSubDomains")
        .set_body_string(body)
}

async fn collect_found(config: RunConfig) -> Vec<String> {
    let enumerator = Enumerator::new(
        Arc::new(config),
        Arc::new(prober(Vec::new())),
        Arc::new(TextDiffComparator),
    );
    let (tx, mut rx) = mpsc::unbounded_channel();
    enumerator.run(tx).await.unwrap();

    let mut found = Vec::new();
    while let Some(event) = rx.recv().await {
        if matches!(event.outcome, Outcome::Found { .. }) {
            found.push(event.host);
        }
    }
    found
}

#[tokio::test]
async fn default_threshold_finds_vhost_behind_realistic_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("host", "admin"))
        .respond_with(nginx_page(200, "<h1>Admin Login</h1>"))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(nginx_page(404, "<h1>404 Not Found</h1>"))
        .mount(&server)
        .await;

    let addr = *server.address();
    let defaults = RunConfig::default();
    let config = RunConfig {
        ips: vec![addr.ip().to_string()],
        ports: vec![addr.port()],
        tls: false,
        wordlist: vec!["admin".into(), "api".into(), "www".into()],
        ..defaults
    };
    assert!((config.threshold - 0.60).abs() < f64::EPSILON);

    assert_eq!(collect_found(config).await, vec!["admin"]);
}

#[tokio::test]
async fn public_fetch_keeps_host_and_sends_custom_headers() {
    let server = MockServer::start().await;
    let domain = format!("127.0.0.1:{}", server.address().port());

    Mock::given(method("GET"))
        .and(path("/login"))
        .and(header("host", domain.as_str()))
        .and(header("x-api-key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string("public login"))
        .expect(1)
        .mount(&server)
        .await;

    let prober = prober(vec![("X-Api-Key".to_string(), "secret".to_string())]);
    let public = prober.fetch_public(&domain, "/login", false).await.unwrap();
    assert_eq!(public.status, 200);
    assert!(public.raw_text.ends_with("\r\n\r\npublic login"));
}

/// One-shot HTTPS listener with a freshly generated self-signed certificate.
/// Resolves with the Host header of the request it served.
async fn self_signed_server() -> (u16, oneshot::Receiver<String>) {
    let CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));
    let tls = ServerConfig::builder_with_provider(Arc::new(crypto::ring::default_provider()))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![cert.der().clone()], key)
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(tls));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (host_tx, host_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let mut stream = acceptor.accept(socket).await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let text = String::from_utf8_lossy(&request).to_string();
        let host = text
            .lines()
            .find_map(|line| line.strip_prefix("host: ").or_else(|| line.strip_prefix("Host: ")))
            .unwrap_or_default()
            .to_string();

        stream
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 6\r\nconnection: close\r\n\r\nsecret")
            .await
            .unwrap();
        stream.shutdown().await.unwrap();
        let _ = host_tx.send(host);
    });

    (port, host_rx)
}

#[tokio::test]
async fn self_signed_certificates_are_accepted() {
    let (port, host_rx) = self_signed_server().await;
    let target = Target::new("127.0.0.1", port, true);

    let response = prober(Vec::new())
        .probe(&target, "/", "intranet.example.com")
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    assert!(response.raw_text.ends_with("secret"));
    assert_eq!(host_rx.await.unwrap(), "intranet.example.com");
}
