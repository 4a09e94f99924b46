//! HTTP client for the mock server's configuration endpoint.

use crate::hook::HookError;
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Full;
use hyper::client::conn::http1;
use hyper::header::{CONTENT_TYPE, HOST};
use hyper::{Method, Request, Uri};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tracing::debug;

/// A single configuration request to the mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigureRequest {
    /// Absolute endpoint URI.
    pub uri: String,
    /// Value of the `Content-Type` header.
    pub content_type: String,
    /// Request body, sent as-is.
    pub body: Bytes,
}

/// Acknowledgement returned by the mock server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushReceipt {
    /// HTTP status returned by the mock server.
    pub status: u16,
}

impl PushReceipt {
    /// Check if the mock server answered with a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Answer to a dispatched request, which may never arrive.
pub struct PendingResponse {
    rx: oneshot::Receiver<Result<PushReceipt, HookError>>,
}

impl PendingResponse {
    /// Create a pending response and the sender that resolves it.
    pub fn channel() -> (oneshot::Sender<Result<PushReceipt, HookError>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// A response that has already arrived.
    pub fn ready(result: Result<PushReceipt, HookError>) -> Self {
        let (tx, pending) = Self::channel();
        let _ = tx.send(result);
        pending
    }

    /// Take the answer if it has arrived. Never waits.
    pub fn try_receipt(&mut self) -> Option<Result<PushReceipt, HookError>> {
        self.rx.try_recv().ok()
    }
}

/// Transport used to deliver fixtures to the mock server.
#[async_trait]
pub trait ConfigureClient: Send + Sync {
    /// Dispatch the request. Resolves once the request has been handed to an
    /// open connection, without waiting for the server to answer.
    async fn dispatch(&self, request: ConfigureRequest) -> Result<PendingResponse, HookError>;
}

/// [`ConfigureClient`] speaking plain HTTP/1.1 over a fresh connection.
///
/// No retries and no request timeout.
#[derive(Debug, Clone, Default)]
pub struct HttpConfigureClient;

impl HttpConfigureClient {
    /// Create a new client.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ConfigureClient for HttpConfigureClient {
    async fn dispatch(&self, request: ConfigureRequest) -> Result<PendingResponse, HookError> {
        let ConfigureRequest {
            uri,
            content_type,
            body,
        } = request;

        let invalid = |reason: String| HookError::InvalidEndpoint {
            uri: uri.clone(),
            reason,
        };

        let parsed = uri.parse::<Uri>().map_err(|e| invalid(format!("{}", e)))?;
        let host = parsed
            .host()
            .ok_or_else(|| invalid("missing host".to_string()))?
            .to_string();
        let port = parsed.port_u16().unwrap_or(80);
        let authority = parsed
            .authority()
            .map(|a| a.as_str().to_string())
            .unwrap_or_else(|| host.clone());
        let path = parsed
            .path_and_query()
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        let req = Request::builder()
            .method(Method::POST)
            .uri(path.as_str())
            .header(HOST, authority.as_str())
            .header(CONTENT_TYPE, content_type.as_str())
            .body(Full::new(body))
            .map_err(|e| invalid(e.to_string()))?;

        let stream = TcpStream::connect((host.as_str(), port))
            .await
            .map_err(|source| HookError::Connect {
                uri: uri.clone(),
                source,
            })?;

        let (mut sender, conn) = http1::handshake(TokioIo::new(stream))
            .await
            .map_err(|source| HookError::Push {
                uri: uri.clone(),
                source,
            })?;

        tokio::task::spawn(async move {
            if let Err(err) = conn.await {
                debug!("Configure connection closed: {:?}", err);
            }
        });

        // Queues the request on the connection before returning.
        let response = sender.send_request(req);
        let (tx, pending) = PendingResponse::channel();

        tokio::task::spawn(async move {
            let _sender = sender;
            let result = response
                .await
                .map(|res| PushReceipt {
                    status: res.status().as_u16(),
                })
                .map_err(|source| HookError::Push { uri, source });
            // The hook may have stopped listening already.
            let _ = tx.send(result);
        });

        Ok(pending)
    }
}
