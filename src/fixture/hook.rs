//! The "before all" hook that pushes fixtures to the mock server.

use crate::fixture::client::{ConfigureClient, ConfigureRequest, HttpConfigureClient};
use crate::fixture::config::{FixtureConfig, PushFailurePolicy};
use crate::fixture::loader::load_fixture;
use crate::hook::{HookContext, HookError, LifecycleHook};
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Result of a single fixture push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// No fixture file was found; nothing was sent.
    Skipped,
    /// Fixtures were dispatched and the settle delay has elapsed.
    Pushed {
        /// Status returned by the mock server, if it answered within the delay.
        status: Option<u16>,
        /// Number of bytes sent.
        bytes: usize,
    },
    /// Delivery failed and the policy allowed the suite to continue.
    Failed {
        /// Description of the failure.
        reason: String,
    },
}

/// Loads the fixture file and posts it to the mock server.
pub struct FixtureHook<C = HttpConfigureClient> {
    config: FixtureConfig,
    client: C,
}

impl FixtureHook<HttpConfigureClient> {
    /// Create a hook that talks to the mock server over HTTP.
    pub fn new(config: FixtureConfig) -> Self {
        Self::with_client(config, HttpConfigureClient::new())
    }
}

impl<C: ConfigureClient> FixtureHook<C> {
    /// Create a hook with a custom transport.
    pub fn with_client(config: FixtureConfig, client: C) -> Self {
        Self { config, client }
    }

    /// Get the hook configuration.
    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    /// Push the fixture file once.
    ///
    /// When a file was sent, this resolves once the settle delay has elapsed
    /// since dispatch. The server's answer is not awaited; its status is
    /// logged if it arrived in time.
    pub async fn push(&self) -> Result<PushOutcome, HookError> {
        let payload = match load_fixture(&self.config.fixture_path).await? {
            Some(payload) => payload,
            None => {
                info!("No fixtures found, skipping hook.");
                return Ok(PushOutcome::Skipped);
            }
        };

        let bytes = payload.len();
        let uri = self.config.endpoint_uri();
        debug!(
            "Pushing {} bytes from {} to {}",
            bytes,
            payload.path.display(),
            uri
        );

        let request = ConfigureRequest {
            uri: uri.clone(),
            content_type: self.config.content_type.clone(),
            body: payload.into_body(),
        };

        let mut pending = match self.client.dispatch(request).await {
            Ok(pending) => pending,
            Err(e) => return self.push_failed(e),
        };

        // No acknowledgement protocol exists; give the server time to apply the config.
        tokio::time::sleep(self.config.settle_delay()).await;

        let status = match pending.try_receipt() {
            Some(Ok(receipt)) => {
                if !receipt.is_success() {
                    warn!(
                        "Mock server answered fixture push with status {}",
                        receipt.status
                    );
                }
                Some(receipt.status)
            }
            Some(Err(e)) => return self.push_failed(e),
            None => {
                debug!("Mock server has not answered the fixture push yet");
                None
            }
        };

        info!("Pushed {} bytes of fixtures to {}", bytes, uri);

        Ok(PushOutcome::Pushed { status, bytes })
    }

    fn push_failed(&self, e: HookError) -> Result<PushOutcome, HookError> {
        match self.config.on_push_failure {
            PushFailurePolicy::Abort => Err(e),
            PushFailurePolicy::Continue => {
                warn!("Fixture push failed, continuing without fixtures: {}", e);
                Ok(PushOutcome::Failed {
                    reason: e.to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl<C: ConfigureClient> LifecycleHook for FixtureHook<C> {
    async fn before_all(&self, ctx: &HookContext) -> Result<(), HookError> {
        debug!("Fixture hook invoked [{}]", ctx.invocation_id);
        self.push().await.map(|_| ())
    }

    fn name(&self) -> &str {
        "ersatz-fixtures"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::client::{PendingResponse, PushReceipt};
    use crate::hook::HookEvent;
    use bytes::Bytes;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::tempdir;
    use tokio::sync::oneshot;

    type Answer = Result<PushReceipt, HookError>;

    /// How the recording client answers.
    #[derive(Clone, Copy)]
    enum Reply {
        Status(u16),
        Refuse,
        Reset,
        Silent,
    }

    /// Records requests instead of sending them.
    #[derive(Clone)]
    struct RecordingClient {
        requests: Arc<Mutex<Vec<ConfigureRequest>>>,
        unanswered: Arc<Mutex<Vec<oneshot::Sender<Answer>>>>,
        reply: Reply,
    }

    impl RecordingClient {
        fn replying(reply: Reply) -> Self {
            Self {
                requests: Arc::new(Mutex::new(Vec::new())),
                unanswered: Arc::new(Mutex::new(Vec::new())),
                reply,
            }
        }

        fn answering(status: u16) -> Self {
            Self::replying(Reply::Status(status))
        }

        fn requests(&self) -> Vec<ConfigureRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    fn refused() -> HookError {
        HookError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ))
    }

    #[async_trait]
    impl ConfigureClient for RecordingClient {
        async fn dispatch(&self, request: ConfigureRequest) -> Result<PendingResponse, HookError> {
            match self.reply {
                Reply::Refuse => return Err(refused()),
                _ => self.requests.lock().unwrap().push(request),
            }
            Ok(match self.reply {
                Reply::Status(status) => PendingResponse::ready(Ok(PushReceipt { status })),
                Reply::Reset => PendingResponse::ready(Err(refused())),
                Reply::Silent | Reply::Refuse => {
                    let (tx, pending) = PendingResponse::channel();
                    self.unanswered.lock().unwrap().push(tx);
                    pending
                }
            })
        }
    }

    /// Log sink shared with a fmt subscriber.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }

        fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
            let sink = self.clone();
            tracing_subscriber::fmt()
                .with_writer(move || sink.clone())
                .with_ansi(false)
                .without_time()
                .with_max_level(tracing::Level::INFO)
                .finish()
        }
    }

    fn config_in(dir: &std::path::Path) -> FixtureConfig {
        FixtureConfig::new().fixture_path(dir.join("ersatz-fixtures.yml"))
    }

    fn write_fixture(dir: &std::path::Path, contents: &[u8]) {
        std::fs::write(dir.join("ersatz-fixtures.yml"), contents).unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_absent_file_skips_without_request_or_delay() {
        let dir = tempdir().unwrap();
        let client = RecordingClient::answering(200);
        let hook = FixtureHook::with_client(config_in(dir.path()), client.clone());

        let start = tokio::time::Instant::now();
        let outcome = hook.push().await.unwrap();

        assert_eq!(outcome, PushOutcome::Skipped);
        assert!(client.requests().is_empty());
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_absent_file_logs_skip_message_once() {
        let dir = tempdir().unwrap();
        let logs = LogBuffer::default();
        let _guard = tracing::subscriber::set_default(logs.subscriber());

        let hook = FixtureHook::with_client(config_in(dir.path()), RecordingClient::answering(200));
        hook.push().await.unwrap();

        let output = logs.contents();
        assert_eq!(
            output.matches("No fixtures found, skipping hook.").count(),
            1,
            "log output: {}",
            output
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_present_file_does_not_log_skip_message() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path(), b"key: value\n");
        let logs = LogBuffer::default();
        let _guard = tracing::subscriber::set_default(logs.subscriber());

        let hook = FixtureHook::with_client(config_in(dir.path()), RecordingClient::answering(200));
        hook.push().await.unwrap();

        let output = logs.contents();
        assert!(!output.contains("No fixtures found"), "log output: {}", output);
        assert!(output.contains("Pushed 11 bytes of fixtures"), "log output: {}", output);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pushes_file_contents_exactly() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path(), b"key: value\n");
        let client = RecordingClient::answering(200);
        let hook = FixtureHook::with_client(config_in(dir.path()), client.clone());

        let outcome = hook.push().await.unwrap();

        assert_eq!(
            outcome,
            PushOutcome::Pushed {
                status: Some(200),
                bytes: 11
            }
        );
        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].uri, hook.config().endpoint_uri());
        assert_eq!(requests[0].uri, "http://localhost:9000/__configure");
        assert_eq!(requests[0].content_type, "application/x-yaml");
        assert_eq!(requests[0].body, Bytes::from_static(b"key: value\n"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_settle_delay_after_dispatch() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path(), b"key: value\n");
        let hook = FixtureHook::with_client(config_in(dir.path()), RecordingClient::answering(200));

        let start = tokio::time::Instant::now();
        hook.push().await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(5000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_server_does_not_hold_completion() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path(), b"key: value\n");
        let client = RecordingClient::replying(Reply::Silent);
        let hook = FixtureHook::with_client(config_in(dir.path()), client.clone());

        let start = tokio::time::Instant::now();
        let outcome = hook.push().await.unwrap();

        assert_eq!(
            outcome,
            PushOutcome::Pushed {
                status: None,
                bytes: 11
            }
        );
        assert!(start.elapsed() >= Duration::from_millis(5000));
        assert!(start.elapsed() < Duration::from_secs(6));
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_success_status_is_not_fatal() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path(), b"key: value\n");
        let hook = FixtureHook::with_client(config_in(dir.path()), RecordingClient::answering(500));

        let outcome = hook.push().await.unwrap();
        assert!(matches!(
            outcome,
            PushOutcome::Pushed {
                status: Some(500),
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_failure_aborts_by_default() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path(), b"key: value\n");
        let client = RecordingClient::replying(Reply::Refuse);
        let hook = FixtureHook::with_client(config_in(dir.path()), client.clone());

        let start = tokio::time::Instant::now();
        let result = hook.push().await;

        assert!(result.is_err());
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_failure_can_continue() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path(), b"key: value\n");
        let config = config_in(dir.path()).on_push_failure(PushFailurePolicy::Continue);
        let hook = FixtureHook::with_client(config, RecordingClient::replying(Reply::Refuse));

        let start = tokio::time::Instant::now();
        let outcome = hook.push().await.unwrap();

        assert!(matches!(outcome, PushOutcome::Failed { .. }));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_after_dispatch_follows_policy() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path(), b"key: value\n");

        let hook = FixtureHook::with_client(config_in(dir.path()), RecordingClient::replying(Reply::Reset));
        assert!(hook.push().await.is_err());

        let config = config_in(dir.path()).on_push_failure(PushFailurePolicy::Continue);
        let hook = FixtureHook::with_client(config, RecordingClient::replying(Reply::Reset));
        assert!(matches!(
            hook.push().await.unwrap(),
            PushOutcome::Failed { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreadable_file_is_fatal_without_request() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path(), &[0xff, 0xfe]);
        let client = RecordingClient::answering(200);
        let hook = FixtureHook::with_client(config_in(dir.path()), client.clone());

        let result = hook.push().await;

        assert!(matches!(result, Err(HookError::FixtureRead { .. })));
        assert!(client.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_before_all_runs_push() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path(), b"a: 1\n");
        let client = RecordingClient::answering(200);
        let hook = FixtureHook::with_client(config_in(dir.path()), client.clone());

        let ctx = HookContext::new(HookEvent::BeforeAll, "inv-1");
        hook.before_all(&ctx).await.unwrap();
        hook.after_all(&HookContext::new(HookEvent::AfterAll, "inv-1"))
            .await
            .unwrap();

        assert_eq!(client.requests().len(), 1);
        assert_eq!(hook.name(), "ersatz-fixtures");
    }
}
