//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use flate2::write::GzEncoder;
use flate2::Compression;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use config_refresh::config::{default_configuration, Configuration};
use config_refresh::fetch::{ConfigFetcher, DirectTransport};
use config_refresh::security::FrontedRouter;
use config_refresh::settings::EtagPolicy;
use config_refresh::{RefreshContext, RefreshSettings, Refresher};

/// A canned HTTP reply.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub etag: Option<String>,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn ok(etag: &str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            etag: Some(etag.to_string()),
            body,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            etag: None,
            body: Vec::new(),
        }
    }
}

/// Raw request heads received by a mock backend.
#[derive(Clone, Default)]
pub struct Recorded(Arc<Mutex<Vec<String>>>);

impl Recorded {
    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    /// Value of `name` in the `index`-th request.
    pub fn header(&self, index: usize, name: &str) -> Option<String> {
        let requests = self.0.lock().unwrap();
        let prefix = format!("{}:", name.to_ascii_lowercase());
        requests[index]
            .lines()
            .find(|line| line.to_ascii_lowercase().starts_with(&prefix))
            .map(|line| line[prefix.len()..].trim().to_string())
    }
}

/// Start a mock config server; `f` picks the reply for the n-th request.
pub async fn start_config_backend<F>(f: F) -> (SocketAddr, Recorded)
where
    F: Fn(usize) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let recorded = Recorded::default();
    let log = recorded.clone();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let log = log.clone();
                    tokio::spawn(async move {
                        let head = read_head(&mut socket).await;
                        let index = {
                            let mut requests = log.0.lock().unwrap();
                            requests.push(head);
                            requests.len() - 1
                        };
                        let reply = f(index);

                        let reason = match reply.status {
                            200 => "OK",
                            304 => "Not Modified",
                            404 => "Not Found",
                            500 => "Internal Server Error",
                            503 => "Service Unavailable",
                            _ => "Unknown",
                        };
                        let mut response = format!("HTTP/1.1 {} {}\r\n", reply.status, reason);
                        if let Some(etag) = &reply.etag {
                            response.push_str(&format!("ETag: {}\r\n", etag));
                        }
                        if reply.status != 304 {
                            response.push_str(&format!("Content-Length: {}\r\n", reply.body.len()));
                        }
                        response.push_str("Connection: close\r\n\r\n");

                        let mut bytes = response.into_bytes();
                        bytes.extend_from_slice(&reply.body);
                        let _ = socket.write_all(&bytes).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, recorded)
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Settings pointing at a mock backend.
pub fn settings_for(addr: SocketAddr, policy: EtagPolicy) -> RefreshSettings {
    let mut settings = RefreshSettings::default();
    settings.endpoints.primary_url = format!("http://{}/cloud.yaml.gz", addr);
    settings.endpoints.fronted_url = format!("http://{}/fronted/cloud.yaml.gz", addr);
    settings.fetch.timeout_secs = 5;
    settings.fetch.etag_policy = policy;
    settings
}

/// A refresher wired to a mock backend, seeded with the embedded defaults.
pub fn refresher_for(
    addr: SocketAddr,
    policy: EtagPolicy,
) -> (Arc<Refresher>, Arc<RefreshContext>, Arc<FrontedRouter>) {
    refresher_with(addr, policy, default_configuration())
}

/// A refresher wired to a mock backend, seeded with `initial`.
pub fn refresher_with(
    addr: SocketAddr,
    policy: EtagPolicy,
    initial: Configuration,
) -> (Arc<Refresher>, Arc<RefreshContext>, Arc<FrontedRouter>) {
    let settings = settings_for(addr, policy);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();
    let transport = Arc::new(DirectTransport::with_client(client));
    let fetcher = ConfigFetcher::new(transport, &settings).unwrap();
    let context = Arc::new(RefreshContext::new(initial));
    let router = Arc::new(FrontedRouter::new());
    let refresher = Arc::new(Refresher::new(context.clone(), fetcher, router.clone()));
    (refresher, context, router)
}

/// YAML for a document with the given servers and CA PEMs.
pub fn document(servers: &[&str], cas: &[&str], version: &str) -> String {
    let mut doc = String::from("client:\n  chainedservers:\n");
    for server in servers {
        doc.push_str(&format!("    - addr: \"{}\"\n      pipelined: true\n", server));
    }
    if servers.is_empty() {
        doc = String::from("client:\n  chainedservers: []\n");
    }
    doc.push_str("  masqueradesets:\n    cloudfront:\n      - domain: \"cloudfront.net\"\n        ipaddress: \"54.182.0.1\"\n");
    doc.push_str("trustedcas:\n");
    for (i, pem) in cas.iter().enumerate() {
        doc.push_str(&format!("  - commonname: \"ca-{}\"\n    cert: |\n", i));
        for line in pem.lines() {
            doc.push_str(&format!("      {}\n", line));
        }
    }
    if cas.is_empty() {
        doc.push_str("  []\n");
    }
    doc.push_str("instanceid: \"test-instance\"\n");
    doc.push_str(&format!("firetweetversion: \"{}\"\n", version));
    doc
}
