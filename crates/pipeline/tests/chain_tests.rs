use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pipeline::{
    Method, Next, Pipeline, PipelineError, PipelinePosition, Policy, Request, RequestUri, Response,
    StatusCode, Transport, TransportError,
};

/// Appends its name to a shared journal, then forwards.
#[derive(Debug)]
struct Journaling {
    name: &'static str,
    journal: Arc<Mutex<Vec<String>>>,
}

impl Journaling {
    fn record(&self, path: &str) {
        self.journal
            .lock()
            .expect("journal lock")
            .push(format!("{}:{path}", self.name));
    }
}

#[async_trait]
impl Policy for Journaling {
    fn name(&self) -> &str {
        self.name
    }

    fn process(&self, request: &mut Request, next: Next<'_>) -> Result<Response, PipelineError> {
        self.record("sync");
        next.run(request)
    }

    async fn process_async(
        &self,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Response, PipelineError> {
        self.record("async");
        next.run_async(request).await
    }
}

/// Answers without forwarding.
#[derive(Debug)]
struct ShortCircuit;

#[async_trait]
impl Policy for ShortCircuit {
    fn name(&self) -> &str {
        "short_circuit"
    }

    fn process(&self, _request: &mut Request, _next: Next<'_>) -> Result<Response, PipelineError> {
        Ok(Response::new(StatusCode::new(304)))
    }

    async fn process_async(
        &self,
        _request: &mut Request,
        _next: Next<'_>,
    ) -> Result<Response, PipelineError> {
        Ok(Response::new(StatusCode::new(304)))
    }
}

#[derive(Debug, Default)]
struct CountingTransport {
    sync_sends: AtomicUsize,
    async_sends: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl Transport for CountingTransport {
    fn send(&self, _request: &Request) -> Result<Response, TransportError> {
        self.sync_sends.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TransportError::Timeout);
        }
        Ok(Response::new(StatusCode::OK))
    }

    async fn send_async(&self, _request: &Request) -> Result<Response, TransportError> {
        self.async_sends.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TransportError::Timeout);
        }
        Ok(Response::new(StatusCode::OK))
    }
}

fn request() -> Request {
    Request::new(
        Method::Get,
        RequestUri::parse("https://example.com/chat?x=1").expect("valid uri"),
    )
}

fn journaled_pipeline(
    transport: Arc<CountingTransport>,
) -> (Pipeline, Arc<Mutex<Vec<String>>>) {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let policy = |name| Journaling {
        name,
        journal: journal.clone(),
    };
    let pipeline = Pipeline::builder(transport)
        .add_policy(policy("retry_a"), PipelinePosition::PerRetry)
        .add_policy(policy("call_a"), PipelinePosition::PerCall)
        .add_policy(policy("retry_b"), PipelinePosition::PerRetry)
        .add_policy(policy("call_b"), PipelinePosition::PerCall)
        .build();
    (pipeline, journal)
}

#[test]
fn test_per_call_policies_run_before_per_retry() {
    let (pipeline, _) = journaled_pipeline(Arc::new(CountingTransport::default()));
    assert_eq!(
        pipeline.policy_names(),
        vec!["call_a", "call_b", "retry_a", "retry_b"]
    );
}

#[test]
fn test_blocking_send_visits_each_policy_once_then_transport() {
    let transport = Arc::new(CountingTransport::default());
    let (pipeline, journal) = journaled_pipeline(transport.clone());

    let response = pipeline.send(&mut request()).expect("send succeeds");

    assert!(response.is_success());
    assert_eq!(
        *journal.lock().expect("journal lock"),
        vec!["call_a:sync", "call_b:sync", "retry_a:sync", "retry_b:sync"]
    );
    assert_eq!(transport.sync_sends.load(Ordering::SeqCst), 1);
    assert_eq!(transport.async_sends.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_async_send_stays_on_async_path() {
    let transport = Arc::new(CountingTransport::default());
    let (pipeline, journal) = journaled_pipeline(transport.clone());

    pipeline
        .send_async(&mut request())
        .await
        .expect("send succeeds");

    assert!(journal
        .lock()
        .expect("journal lock")
        .iter()
        .all(|entry| entry.ends_with(":async")));
    assert_eq!(transport.sync_sends.load(Ordering::SeqCst), 0);
    assert_eq!(transport.async_sends.load(Ordering::SeqCst), 1);
}

#[test]
fn test_empty_chain_goes_straight_to_transport() {
    let transport = Arc::new(CountingTransport::default());
    let pipeline = Pipeline::builder(transport.clone()).build();

    pipeline.send(&mut request()).expect("send succeeds");

    assert!(pipeline.policy_names().is_empty());
    assert_eq!(transport.sync_sends.load(Ordering::SeqCst), 1);
}

#[test]
fn test_short_circuit_skips_transport() {
    let transport = Arc::new(CountingTransport::default());
    let pipeline = Pipeline::builder(transport.clone())
        .add_policy(ShortCircuit, PipelinePosition::PerCall)
        .build();

    let response = pipeline.send(&mut request()).expect("send succeeds");

    assert_eq!(response.status, StatusCode::new(304));
    assert_eq!(transport.sync_sends.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_transport_failure_propagates() {
    let transport = Arc::new(CountingTransport {
        fail: true,
        ..CountingTransport::default()
    });
    let (pipeline, _) = journaled_pipeline(transport);

    let err = pipeline
        .send_async(&mut request())
        .await
        .expect_err("transport fails");

    assert!(matches!(err, PipelineError::Transport(TransportError::Timeout)));
}

#[tokio::test]
async fn test_pipeline_is_shared_across_concurrent_tasks() {
    let transport = Arc::new(CountingTransport::default());
    let (pipeline, journal) = journaled_pipeline(transport.clone());

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let pipeline = pipeline.clone();
            tokio::spawn(async move { pipeline.send_async(&mut request()).await })
        })
        .collect();
    for task in tasks {
        task.await.expect("task joins").expect("send succeeds");
    }

    assert_eq!(transport.async_sends.load(Ordering::SeqCst), 16);
    assert_eq!(journal.lock().expect("journal lock").len(), 16 * 4);
}
