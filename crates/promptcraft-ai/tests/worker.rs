//! The generation worker hands results back to a plain (non-async) thread,
//! the way an interactive front end drives it.

mod common;

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use common::{controller, hits, mount_tags, FakeHost};
use promptcraft_ai::{GenerationCompleted, GenerationWorker, SubmitError};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT: Duration = Duration::from_secs(10);

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

fn mock_service(rt: &tokio::runtime::Runtime, delay: Duration) -> MockServer {
    rt.block_on(async {
        let server = MockServer::start().await;
        mount_tags(&server, &["tinyllama:latest"]).await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "response": "Write about the tide." }))
                    .set_delay(delay),
            )
            .mount(&server)
            .await;
        server
    })
}

#[test]
fn test_result_posted_back_to_interactive_thread() {
    let rt = runtime();
    let server = mock_service(&rt, Duration::ZERO);

    let (host, _calls) = FakeHost::running();
    let controller = Arc::new(controller(&server.uri(), host));
    let (tx, rx) = mpsc::channel::<GenerationCompleted>();
    let worker = GenerationWorker::new(controller, rt.handle().clone(), tx);

    let id = worker.submit("a lighthouse keeper").unwrap();
    let completed = rx.recv_timeout(WAIT).unwrap();

    assert_eq!(completed.id, id);
    assert_eq!(completed.description, "a lighthouse keeper");
    assert_eq!(completed.result, Ok("Write about the tide.".to_string()));
    assert!(!worker.is_busy());
}

#[test]
fn test_second_submission_rejected_while_busy() {
    let rt = runtime();
    let server = mock_service(&rt, Duration::from_millis(300));

    let (host, _calls) = FakeHost::running();
    let controller = Arc::new(controller(&server.uri(), host));
    let (tx, rx) = mpsc::channel::<GenerationCompleted>();
    let worker = GenerationWorker::new(controller, rt.handle().clone(), tx);

    let first = worker.submit("first").unwrap();
    assert!(worker.is_busy());
    assert_eq!(worker.submit("second"), Err(SubmitError::Busy));

    let completed = rx.recv_timeout(WAIT).unwrap();
    assert_eq!(completed.id, first);

    let third = worker.submit("third").unwrap();
    assert_ne!(third, first);
    assert_eq!(rx.recv_timeout(WAIT).unwrap().id, third);
    assert_eq!(rt.block_on(hits(&server, "/api/generate")), 2);
}

#[test]
fn test_blank_submission_rejected_synchronously() {
    let rt = runtime();
    let server = rt.block_on(MockServer::start());

    let (host, _calls) = FakeHost::running();
    let controller = Arc::new(controller(&server.uri(), host));
    let (tx, rx) = mpsc::channel::<GenerationCompleted>();
    let worker = GenerationWorker::new(controller, rt.handle().clone(), tx);

    assert_eq!(worker.submit("   \n"), Err(SubmitError::EmptyInput));
    assert!(!worker.is_busy());
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    assert!(rt.block_on(server.received_requests()).unwrap().is_empty());
}
