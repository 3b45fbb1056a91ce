//! Process management for the Ollama server.
//!
//! [`ServiceHost`] is the seam between the readiness controller and the
//! operating system: it answers whether a service process is already active
//! and spawns a new one. [`SystemHost`] is the real implementation.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};
use tracing::{debug, info, warn};

use crate::error::OllamaError;
use crate::paths;

/// Operating-system operations needed to bootstrap the service.
pub trait ServiceHost: Send + Sync {
    /// Whether any process whose name contains `name` is running.
    fn is_process_active(&self, name: &str) -> bool;

    /// Resolve the executable to launch.
    fn locate_executable(&self, explicit: Option<&Path>) -> Option<PathBuf> {
        paths::locate_ollama(explicit)
    }

    /// Spawn `program` with `args` in the background, output discarded.
    fn spawn(&self, program: &Path, args: &[&str]) -> Result<Box<dyn ServiceChild>, OllamaError>;
}

/// A process spawned by a [`ServiceHost`].
pub trait ServiceChild: Send {
    /// OS process id.
    fn id(&self) -> u32;

    /// Whether the process is still running. Reaps it if it has exited.
    fn is_alive(&mut self) -> bool;

    /// Stop the process and reap it.
    fn terminate(&mut self) -> Result<(), OllamaError>;
}

/// [`ServiceHost`] backed by the real process table.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl SystemHost {
    pub fn new() -> Self {
        Self
    }
}

impl ServiceHost for SystemHost {
    fn is_process_active(&self, name: &str) -> bool {
        let mut sys = System::new_with_specifics(
            RefreshKind::nothing().with_processes(ProcessRefreshKind::nothing()),
        );
        sys.refresh_processes(ProcessesToUpdate::All, true);

        let needle = name.to_lowercase();
        let found = sys
            .processes()
            .values()
            .any(|p| p.name().to_string_lossy().to_lowercase().contains(&needle));

        debug!("Process matching '{}' active: {}", name, found);
        found
    }

    fn spawn(&self, program: &Path, args: &[&str]) -> Result<Box<dyn ServiceChild>, OllamaError> {
        info!("Starting {} {}", program.display(), args.join(" "));

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Keep terminal signals aimed at the host from reaching the server.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                OllamaError::BinaryNotFound
            } else {
                OllamaError::ServerStartFailed(e.to_string())
            }
        })?;

        debug!("Server process started with PID: {}", child.id());
        Ok(Box::new(SpawnedProcess { child }))
    }
}

/// A child process started by [`SystemHost`].
#[derive(Debug)]
pub struct SpawnedProcess {
    child: Child,
}

impl ServiceChild for SpawnedProcess {
    fn id(&self) -> u32 {
        self.child.id()
    }

    fn is_alive(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!(
                    "Server (PID: {}) exited with status: {:?}",
                    self.child.id(),
                    status
                );
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!("Error checking server status: {}", e);
                false
            }
        }
    }

    fn terminate(&mut self) -> Result<(), OllamaError> {
        if let Ok(Some(status)) = self.child.try_wait() {
            debug!("Server already exited with status: {:?}", status);
            return Ok(());
        }

        info!("Stopping Ollama server (PID: {})", self.child.id());

        // Try graceful shutdown first
        #[cfg(unix)]
        {
            unsafe {
                libc::kill(self.child.id() as i32, libc::SIGTERM);
            }
            std::thread::sleep(std::time::Duration::from_millis(500));
        }

        match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!("Server exited with status: {:?}", status);
            }
            Ok(None) => {
                warn!("Server didn't exit gracefully, killing...");
                self.child.kill()?;
                self.child.wait()?;
            }
            Err(e) => {
                warn!("Error checking server status: {}", e);
                self.child.kill()?;
            }
        }
        Ok(())
    }
}
