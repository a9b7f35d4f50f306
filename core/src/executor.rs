//! The request executor: resolve, submit once, classify.
//!
//! # Design
//! `Executor` holds only its transport and a verbose default, so every call
//! is independent.
//! The awaitable methods are the core; the `*_then` callback methods spawn
//! the same future on the current tokio runtime and hand its outcome to a
//! completion closure exactly once.

use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;

use crate::error::NetError;
use crate::http::{HttpMethod, HttpResponse, RequestDescriptor};
use crate::options::RequestOptions;
use crate::pipeline::{parse_bytes_response, parse_json_response};
use crate::request::{Request, UrlSource};
use crate::transport::{Transport, UreqTransport};
use crate::types::Outcome;

/// Stateless front-end over a `Transport`.
///
/// `verbose` turns on body logging for every call made through this
/// executor, on top of whatever each call's options ask for.
#[derive(Debug, Clone, Default)]
pub struct Executor<T = UreqTransport> {
    transport: T,
    verbose: bool,
}

impl Executor {
    /// An executor over a default-configured `UreqTransport`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Transport> Executor<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Run one request and decode a JSON body into `D`.
    ///
    /// A 204 response yields `data: None`. An invalid URL fails before the
    /// transport is touched.
    pub async fn execute<D>(&self, request: Request) -> Outcome<Option<D>>
    where
        D: DeserializeOwned,
    {
        let (descriptor, options) = request.into_parts()?;
        self.execute_descriptor(descriptor, Some(options)).await
    }

    /// Run a descriptor that was built ahead of time.
    pub async fn execute_descriptor<D>(
        &self,
        descriptor: RequestDescriptor,
        options: Option<RequestOptions>,
    ) -> Outcome<Option<D>>
    where
        D: DeserializeOwned,
    {
        let mut options = options.unwrap_or_default();
        if self.verbose {
            options = options.with_verbose(true);
        }
        let response = self.submit(descriptor, options.priority()).await?;
        parse_json_response(response, &options)
    }

    /// GET `url` and return the body bytes undecoded.
    pub async fn load_bytes(&self, url: impl Into<UrlSource>) -> Outcome<Vec<u8>> {
        let descriptor = RequestDescriptor::new(url.into().resolve()?, HttpMethod::Get);
        let response = self
            .submit(descriptor, RequestOptions::DEFAULT_PRIORITY)
            .await?;
        parse_bytes_response(response)
    }

    async fn submit(
        &self,
        descriptor: RequestDescriptor,
        priority: f32,
    ) -> Result<HttpResponse, NetError> {
        let method = descriptor.method();
        let url = descriptor.url().clone();
        log::debug!("{method} {url}");

        match self.transport.send(descriptor, priority).await {
            Ok(response) => {
                log::debug!("{method} {url} -> {:?}", response.status);
                Ok(response)
            }
            Err(e) => {
                log::debug!("{method} {url} failed: {e}");
                Err(NetError::Transport(e))
            }
        }
    }
}

impl<T> Executor<T>
where
    T: Transport + Clone + 'static,
{
    /// Callback form of [`Executor::execute`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn execute_then<D, F>(&self, request: Request, completion: F) -> JoinHandle<()>
    where
        D: DeserializeOwned + Send + 'static,
        F: FnOnce(Outcome<Option<D>>) + Send + 'static,
    {
        let executor = self.clone();
        tokio::spawn(async move { completion(executor.execute(request).await) })
    }

    /// Callback form of [`Executor::load_bytes`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn load_bytes_then<F>(&self, url: impl Into<UrlSource>, completion: F) -> JoinHandle<()>
    where
        F: FnOnce(Outcome<Vec<u8>>) + Send + 'static,
    {
        let executor = self.clone();
        let url = url.into();
        tokio::spawn(async move { completion(executor.load_bytes(url).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::testing::logs_during;
    use crate::types::Response;
    use serde::Deserialize;
    use serde_json::{json, Map};
    use std::future::Future;
    use std::sync::{mpsc, Arc, Mutex};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Message {
        message: String,
    }

    type Reply = Arc<dyn Fn() -> Result<HttpResponse, TransportError> + Send + Sync>;

    /// Returns a canned reply and records every descriptor it was given.
    #[derive(Clone)]
    struct StubTransport {
        reply: Reply,
        calls: Arc<Mutex<Vec<(RequestDescriptor, f32)>>>,
    }

    impl StubTransport {
        fn replying(status: u16, body: &'static [u8]) -> Self {
            Self::with(move || Ok(HttpResponse::new(status, body)))
        }

        fn with(reply: impl Fn() -> Result<HttpResponse, TransportError> + Send + Sync + 'static) -> Self {
            Self {
                reply: Arc::new(reply),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn calls(&self) -> Vec<(RequestDescriptor, f32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Transport for StubTransport {
        fn send(
            &self,
            request: RequestDescriptor,
            priority: f32,
        ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
            self.calls.lock().unwrap().push((request, priority));
            let reply = (self.reply)();
            async move { reply }
        }
    }

    const URL: &str = "https://kamaal.io/api";

    #[tokio::test]
    async fn ok_json_decodes_with_status() {
        let stub = StubTransport::replying(200, br#"{"message":"yes"}"#);
        let executor = Executor::with_transport(stub.clone());

        let outcome: Outcome<Option<Message>> = executor.execute(Request::get(URL)).await;
        let response = outcome.unwrap();
        assert_eq!(response.status, Some(200));
        assert_eq!(response.data.unwrap().message, "yes");
        assert_eq!(stub.calls().len(), 1);
    }

    #[tokio::test]
    async fn error_status_echoes_body_and_code() {
        let executor = Executor::with_transport(StubTransport::replying(404, b"no such thing"));
        let err = executor
            .execute::<Message>(Request::get(URL))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            NetError::HttpStatus {
                body: "no such thing".to_string(),
                code: 404
            }
        );
    }

    #[tokio::test]
    async fn no_content_is_payload_less_success() {
        let executor = Executor::with_transport(StubTransport::replying(204, b"{{{"));
        let response = executor
            .execute::<Message>(Request::get(URL))
            .await
            .unwrap();
        assert_eq!(response, Response::new(None, Some(204)));
    }

    #[tokio::test]
    async fn invalid_url_never_reaches_the_transport() {
        let stub = StubTransport::replying(200, b"{}");
        let executor = Executor::with_transport(stub.clone());

        for raw in ["", "no-scheme.example/path", "http://[::1"] {
            let err = executor
                .execute::<Message>(Request::get(raw))
                .await
                .unwrap_err();
            assert!(matches!(err, NetError::InvalidUrl { raw: ref r } if r == raw));
        }
        let err = executor.load_bytes("").await.unwrap_err();
        assert!(matches!(err, NetError::InvalidUrl { .. }));

        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_preserves_cause() {
        let stub = StubTransport::with(|| {
            Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )))
        });
        let executor = Executor::with_transport(stub.clone());

        let err = executor
            .execute::<Message>(Request::get(URL))
            .await
            .unwrap_err();
        match err {
            NetError::Transport(cause) => {
                let io = cause.downcast_ref::<std::io::Error>().unwrap();
                assert_eq!(io.kind(), std::io::ErrorKind::ConnectionRefused);
            }
            other => panic!("expected Transport, got {other:?}"),
        }
        assert_eq!(stub.calls().len(), 1, "transport failures are not retried");
    }

    #[tokio::test]
    async fn text_that_is_not_json_is_a_decode_error() {
        let executor = Executor::with_transport(StubTransport::replying(200, b"hello"));
        let err = executor
            .execute::<Message>(Request::get(URL))
            .await
            .unwrap_err();
        assert!(matches!(err, NetError::Decode(_)));
    }

    #[tokio::test]
    async fn repeated_calls_are_identical() {
        let executor = Executor::with_transport(StubTransport::replying(200, br#"{"message":"yes"}"#));

        let first = executor.execute::<Message>(Request::get(URL)).await.unwrap();
        let second = executor.execute::<Message>(Request::get(URL)).await.unwrap();
        assert_eq!(first, second);

        let first = executor.load_bytes(URL).await.unwrap();
        let second = executor.load_bytes(URL).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn descriptor_carries_method_headers_body_and_priority() {
        let stub = StubTransport::replying(201, br#"{"message":"created"}"#);
        let executor = Executor::with_transport(stub.clone());

        let mut body = Map::new();
        body.insert("title".to_string(), json!("Buy milk"));
        let request = Request::post(URL)
            .header("X-Trace", "1")
            .body(body)
            .options(RequestOptions::new(2.0, false));
        executor.execute::<Message>(request).await.unwrap();

        let calls = stub.calls();
        let (descriptor, priority) = &calls[0];
        assert_eq!(descriptor.method(), HttpMethod::Post);
        assert_eq!(descriptor.headers().len(), 1);
        assert_eq!(descriptor.headers()["X-Trace"], "1");
        assert_eq!(descriptor.body(), Some(br#"{"title":"Buy milk"}"#.as_slice()));
        assert_eq!(*priority, 1.0);
    }

    #[tokio::test]
    async fn missing_options_use_default_priority() {
        let stub = StubTransport::replying(200, b"{}");
        let executor = Executor::with_transport(stub.clone());

        executor
            .execute::<serde_json::Value>(Request::get(URL))
            .await
            .unwrap();
        let descriptor = RequestDescriptor::new(url::Url::parse(URL).unwrap(), HttpMethod::Head);
        executor
            .execute_descriptor::<serde_json::Value>(descriptor, None)
            .await
            .unwrap();

        let calls = stub.calls();
        assert_eq!(calls[0].1, RequestOptions::DEFAULT_PRIORITY);
        assert_eq!(calls[1].0.method(), HttpMethod::Head);
        assert_eq!(calls[1].1, RequestOptions::DEFAULT_PRIORITY);
    }

    #[tokio::test]
    async fn load_bytes_returns_body_and_sends_plain_get() {
        let stub = StubTransport::replying(200, &[0x89, b'P', b'N', b'G']);
        let executor = Executor::with_transport(stub.clone());

        let response = executor.load_bytes(URL).await.unwrap();
        assert_eq!(response, Response::new(vec![0x89, b'P', b'N', b'G'], Some(200)));

        let (descriptor, _) = &stub.calls()[0];
        assert_eq!(descriptor.method(), HttpMethod::Get);
        assert!(descriptor.headers().is_empty());
        assert!(descriptor.body().is_none());
    }

    #[tokio::test]
    async fn load_bytes_non_success_is_http_status() {
        let executor = Executor::with_transport(StubTransport::replying(403, b"forbidden"));
        let err = executor.load_bytes(URL).await.unwrap_err();
        assert!(matches!(err, NetError::HttpStatus { ref body, code: 403 } if body == "forbidden"));
    }

    fn logged_lines(executor: &Executor<StubTransport>, request: Request) -> Vec<String> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let (outcome, lines) =
            logs_during(|| runtime.block_on(executor.execute::<Message>(request)));
        outcome.unwrap();
        lines
    }

    #[test]
    fn executor_verbose_applies_to_every_call() {
        let stub = StubTransport::replying(200, br#"{"message":"loud"}"#);
        let body_line = r#"response body: {"message":"loud"}"#;

        let quiet = Executor::with_transport(stub.clone());
        assert!(!quiet.verbose());
        let lines = logged_lines(&quiet, Request::get(URL));
        assert!(!lines.iter().any(|line| line == body_line));

        let loud = Executor::with_transport(stub).with_verbose(true);
        let lines = logged_lines(&loud, Request::get(URL));
        assert!(lines.iter().any(|line| line == body_line));

        let per_call = Request::get(URL).options(RequestOptions::default().with_verbose(true));
        let lines = logged_lines(&quiet, per_call);
        assert!(lines.iter().any(|line| line == body_line));
    }

    #[tokio::test]
    async fn completion_fires_exactly_once() {
        let executor = Executor::with_transport(StubTransport::replying(200, br#"{"message":"yes"}"#));
        let (tx, rx) = mpsc::channel();

        executor
            .execute_then(Request::get(URL), move |outcome: Outcome<Option<Message>>| {
                tx.send(outcome.map(Response::into_data)).unwrap();
            })
            .await
            .unwrap();

        let data = rx.recv().unwrap().unwrap();
        assert_eq!(data.unwrap().message, "yes");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn bytes_completion_receives_failure() {
        let executor = Executor::with_transport(StubTransport::replying(500, b"boom"));
        let (tx, rx) = mpsc::channel();

        executor
            .load_bytes_then(URL, move |outcome| {
                tx.send(outcome).unwrap();
            })
            .await
            .unwrap();

        let err = rx.recv().unwrap().unwrap_err();
        assert_eq!(err.status(), Some(500));
    }
}
