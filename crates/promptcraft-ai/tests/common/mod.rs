//! Shared fixtures for controller and worker tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use promptcraft_ai::{
    OllamaError, PromptCraftConfig, ServiceChild, ServiceHost, ServiceReadinessController,
    Timeouts,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Counts calls made through a [`FakeHost`].
#[derive(Debug, Default)]
pub struct Calls {
    pub spawns: AtomicUsize,
    pub terminations: AtomicUsize,
    /// Set to make the most recently spawned child report that it exited.
    pub child_exited: AtomicBool,
}

impl Calls {
    pub fn spawns(&self) -> usize {
        self.spawns.load(Ordering::SeqCst)
    }

    pub fn terminations(&self) -> usize {
        self.terminations.load(Ordering::SeqCst)
    }

    pub fn kill_child(&self) {
        self.child_exited.store(true, Ordering::SeqCst);
    }
}

/// Process host that never touches the real process table.
pub struct FakeHost {
    pub process_active: bool,
    pub executable: Option<PathBuf>,
    /// Make `spawn` fail the way a permission error would.
    pub spawn_fails: bool,
    pub calls: Arc<Calls>,
}

impl FakeHost {
    /// A host where no service runs yet and the executable is installed.
    pub fn idle() -> (Self, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let host = Self {
            process_active: false,
            executable: Some(PathBuf::from("/opt/ollama/bin/ollama")),
            spawn_fails: false,
            calls: Arc::clone(&calls),
        };
        (host, calls)
    }

    /// A host where a service is already running.
    pub fn running() -> (Self, Arc<Calls>) {
        let (mut host, calls) = Self::idle();
        host.process_active = true;
        (host, calls)
    }
}

impl ServiceHost for FakeHost {
    fn is_process_active(&self, _name: &str) -> bool {
        self.process_active
    }

    fn locate_executable(&self, _explicit: Option<&Path>) -> Option<PathBuf> {
        self.executable.clone()
    }

    fn spawn(&self, _program: &Path, args: &[&str]) -> Result<Box<dyn ServiceChild>, OllamaError> {
        assert_eq!(args, ["serve"]);
        if self.spawn_fails {
            return Err(OllamaError::ServerStartFailed(
                "Permission denied (os error 13)".to_string(),
            ));
        }
        self.calls.spawns.fetch_add(1, Ordering::SeqCst);
        self.calls.child_exited.store(false, Ordering::SeqCst);
        Ok(Box::new(FakeChild {
            calls: Arc::clone(&self.calls),
        }))
    }
}

struct FakeChild {
    calls: Arc<Calls>,
}

impl ServiceChild for FakeChild {
    fn id(&self) -> u32 {
        4242
    }

    fn is_alive(&mut self) -> bool {
        !self.calls.child_exited.load(Ordering::SeqCst)
    }

    fn terminate(&mut self) -> Result<(), OllamaError> {
        self.calls.terminations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn fast_timeouts() -> Timeouts {
    Timeouts {
        health: Duration::from_secs(1),
        listing: Duration::from_secs(1),
        pull: Duration::from_secs(5),
        connect: Duration::from_secs(1),
        read: Duration::from_secs(2),
    }
}

pub fn test_config(base_url: &str) -> PromptCraftConfig {
    PromptCraftConfig::builder()
        .base_url(base_url)
        .model("tinyllama")
        .readiness_attempts(20)
        .readiness_interval(Duration::from_millis(5))
        .timeouts(fast_timeouts())
        .build()
}

pub fn controller(base_url: &str, host: FakeHost) -> ServiceReadinessController {
    ServiceReadinessController::with_host(test_config(base_url), Box::new(host))
        .expect("client builds")
}

/// A URL nothing is listening on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

/// Serve `/api/tags` with the given model names.
pub async fn mount_tags(server: &MockServer, names: &[&str]) {
    let models: Vec<_> = names.iter().map(|n| json!({ "name": n })).collect();
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "models": models })))
        .mount(server)
        .await;
}

/// Number of requests the server saw for `request_path`.
pub async fn hits(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == request_path)
        .count()
}
