//! reqwest-backed snapshot probe

use super::types::{ProbeFailure, ProbePolicy};
use super::SnapshotProbe;
use crate::error::Result;
use crate::state::AppConfig;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

/// Build the HTTP client used for probing.
///
/// Redirects are limited; legacy devices often bounce unauthenticated
/// requests to a login page.
pub fn build_client(config: &AppConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(Duration::from_millis(config.probe_timeout_ms))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .redirect(reqwest::redirect::Policy::limited(3))
        .build()?;
    Ok(client)
}

/// Probes a URL with a single GET
pub struct HttpSnapshotProbe {
    client: reqwest::Client,
    policy: ProbePolicy,
}

impl HttpSnapshotProbe {
    pub fn new(client: reqwest::Client, policy: ProbePolicy) -> Self {
        Self { client, policy }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            build_client(config)?,
            ProbePolicy::from_min_bytes(config.min_snapshot_bytes),
        ))
    }
}

#[async_trait]
impl SnapshotProbe for HttpSnapshotProbe {
    async fn check(&self, url: &str) -> std::result::Result<(), ProbeFailure> {
        // userinfo in the URL becomes a Basic Authorization header
        let mut resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProbeFailure::Transport(e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProbeFailure::Status(status.as_u16()));
        }

        let min_bytes = match self.policy {
            // MJPEG bodies never end; headers are enough
            ProbePolicy::Permissive => return Ok(()),
            ProbePolicy::Strict { min_bytes } => min_bytes,
        };

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !(content_type.starts_with("image/") || content_type.starts_with("multipart/x-mixed-replace")) {
            return Err(ProbeFailure::NotAnImage(content_type));
        }

        let mut got = 0usize;
        while let Some(chunk) = resp
            .chunk()
            .await
            .map_err(|e| ProbeFailure::Transport(e.without_url().to_string()))?
        {
            got += chunk.len();
            if got >= min_bytes {
                return Ok(());
            }
        }
        Err(ProbeFailure::TooSmall { got, min: min_bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// One-shot HTTP responder; returns its base URL and the raw request it saw
    async fn serve_once(response: Vec<u8>) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let _ = tx.send(String::from_utf8_lossy(&buf[..n]).to_string());
            socket.write_all(&response).await.unwrap();
            let _ = socket.shutdown().await;
        });
        (format!("http://{}", addr), rx)
    }

    fn response(status: &str, content_type: &str, body: &[u8]) -> Vec<u8> {
        let mut out = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            content_type,
            body.len()
        )
        .into_bytes();
        out.extend_from_slice(body);
        out
    }

    fn probe(policy: ProbePolicy) -> HttpSnapshotProbe {
        HttpSnapshotProbe::new(build_client(&AppConfig::default()).unwrap(), policy)
    }

    #[tokio::test]
    async fn test_permissive_accepts_2xx() {
        let (base, _) = serve_once(response("200 OK", "text/html", b"<html></html>")).await;
        let result = probe(ProbePolicy::Permissive).check(&format!("{}/snap.jpg", base)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_error_status_fails() {
        let (base, _) = serve_once(response("401 Unauthorized", "text/plain", b"")).await;
        let result = probe(ProbePolicy::Permissive).check(&format!("{}/snap.jpg", base)).await;
        assert_eq!(result, Err(ProbeFailure::Status(401)));
    }

    #[tokio::test]
    async fn test_credentials_sent_as_basic_auth() {
        let (base, seen) = serve_once(response("200 OK", "image/jpeg", b"\xff\xd8\xff")).await;
        let url = base.replace("http://", "http://admin:admin@");
        probe(ProbePolicy::Permissive)
            .check(&format!("{}/cgi-bin/snapshot.cgi", url))
            .await
            .unwrap();

        let request = seen.await.unwrap();
        let auth = request
            .lines()
            .find(|l| l.to_ascii_lowercase().starts_with("authorization:"))
            .unwrap();
        assert!(auth.ends_with("Basic YWRtaW46YWRtaW4="));
    }

    #[tokio::test]
    async fn test_strict_rejects_html() {
        let (base, _) = serve_once(response("200 OK", "text/html", b"<html>login</html>")).await;
        let result = probe(ProbePolicy::Strict { min_bytes: 4 })
            .check(&format!("{}/snap.jpg", base))
            .await;
        assert_eq!(result, Err(ProbeFailure::NotAnImage("text/html".to_string())));
    }

    #[tokio::test]
    async fn test_strict_requires_min_bytes() {
        let (base, _) = serve_once(response("200 OK", "image/jpeg", b"\xff\xd8")).await;
        let result = probe(ProbePolicy::Strict { min_bytes: 1024 })
            .check(&format!("{}/snap.jpg", base))
            .await;
        assert_eq!(result, Err(ProbeFailure::TooSmall { got: 2, min: 1024 }));
    }

    #[tokio::test]
    async fn test_strict_accepts_image() {
        let body = vec![0xffu8; 2048];
        let (base, _) = serve_once(response("200 OK", "image/jpeg", &body)).await;
        let result = probe(ProbePolicy::Strict { min_bytes: 1024 })
            .check(&format!("{}/snap.jpg", base))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let result = probe(ProbePolicy::Permissive)
            .check(&format!("http://{}/snap.jpg", addr))
            .await;
        assert!(matches!(result, Err(ProbeFailure::Transport(_))));
    }
}
