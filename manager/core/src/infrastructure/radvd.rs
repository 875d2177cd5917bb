// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

//! Drives the radvd processes on this router.
//!
//! The manager never holds a live process handle. The PID file written by
//! radvd is the durable handle: every signal delivery re-reads it at time of
//! use, so a restart of the manager itself loses nothing. Artifact names are
//! a pure function of the instance ID.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::application::lifecycle::{LifecycleError, RadvdLifecycle};
use crate::domain::instance::Instance;
use crate::infrastructure::render::ConfigRenderer;

/// Filesystem and binary locations for one router.
#[derive(Debug, Clone)]
pub struct RadvdPaths {
    /// Directory holding one `<id>.conf` per managed instance.
    pub conf_dir: PathBuf,
    /// Directory holding one `radvd.<id>.pid` per running instance.
    pub run_dir: PathBuf,
    /// The radvd executable.
    pub binary: PathBuf,
    /// The pre-existing host-wide config, listed as instance 0.
    pub host_conf: PathBuf,
}

impl Default for RadvdPaths {
    fn default() -> Self {
        Self {
            conf_dir: PathBuf::from("/etc/radvd.d"),
            run_dir: PathBuf::from("/var/run/radvd"),
            binary: PathBuf::from("/usr/sbin/radvd"),
            host_conf: PathBuf::from("/etc/radvd.conf"),
        }
    }
}

impl RadvdPaths {
    pub fn conf_file(&self, id: u32) -> PathBuf {
        self.conf_dir.join(format!("{id}.conf"))
    }

    pub fn pid_file(&self, id: u32) -> PathBuf {
        self.run_dir.join(format!("radvd.{id}.pid"))
    }
}

pub struct RadvdProcessManager {
    paths: RadvdPaths,
    renderer: ConfigRenderer,
}

impl RadvdProcessManager {
    pub fn new(paths: RadvdPaths) -> Self {
        Self {
            paths,
            renderer: ConfigRenderer::new(),
        }
    }

    pub fn paths(&self) -> &RadvdPaths {
        &self.paths
    }

    /// Read and parse the PID file, then confirm the process still exists.
    async fn resolve_pid(&self, id: u32) -> Result<u32, LifecycleError> {
        let pid = self
            .read_pid(id)
            .await
            .ok_or(LifecycleError::ProcessNotFound { id })?;
        if !process_exists(pid) {
            return Err(LifecycleError::ProcessNotFound { id });
        }
        Ok(pid)
    }

    async fn remove_artifacts(&self, id: u32, strict: bool) -> Result<(), LifecycleError> {
        for path in [self.paths.pid_file(id), self.paths.conf_file(id)] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound && !strict => {}
                Err(source) => return Err(LifecycleError::Io { id, source }),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RadvdLifecycle for RadvdProcessManager {
    async fn render(&self, instance: &Instance) -> Result<(), LifecycleError> {
        let id = instance.id;
        let text = self
            .renderer
            .render(instance)
            .map_err(|err| LifecycleError::Render { id, reason: err.to_string() })?;
        tokio::fs::create_dir_all(&self.paths.conf_dir)
            .await
            .map_err(|source| LifecycleError::Io { id, source })?;
        tokio::fs::write(self.paths.conf_file(id), text)
            .await
            .map_err(|source| LifecycleError::Io { id, source })?;
        debug!(id, "rendered radvd config");
        Ok(())
    }

    async fn validate(&self, id: u32) -> Result<(), LifecycleError> {
        let status = Command::new(&self.paths.binary)
            .arg("-C")
            .arg(self.paths.conf_file(id))
            .arg("--configtest")
            .status()
            .await
            .map_err(|source| LifecycleError::Spawn { id, source })?;
        if !status.success() {
            return Err(LifecycleError::InvalidConfig { id });
        }
        Ok(())
    }

    async fn start(&self, id: u32) -> Result<(), LifecycleError> {
        if let Err(source) = tokio::fs::create_dir_all(&self.paths.run_dir).await {
            return Err(LifecycleError::Io { id, source });
        }
        // radvd daemonizes itself; waiting for the parent to exit tells us
        // whether startup succeeded. The PID file it writes is the handle
        // from here on.
        let result = Command::new(&self.paths.binary)
            .arg("-C")
            .arg(self.paths.conf_file(id))
            .arg("-p")
            .arg(self.paths.pid_file(id))
            .arg("-m")
            .arg("syslog")
            .output()
            .await;
        match result {
            Ok(output) if output.status.success() => {
                debug!(id, "started radvd");
                Ok(())
            }
            Ok(output) => {
                let _ = tokio::fs::remove_file(self.paths.conf_file(id)).await;
                Err(LifecycleError::StartFailed {
                    id,
                    status: format!(
                        "{}, stderr: {}",
                        output.status,
                        String::from_utf8_lossy(&output.stderr).trim()
                    ),
                })
            }
            Err(source) => {
                let _ = tokio::fs::remove_file(self.paths.conf_file(id)).await;
                Err(LifecycleError::Spawn { id, source })
            }
        }
    }

    async fn reload(&self, id: u32) -> Result<(), LifecycleError> {
        let pid = self.resolve_pid(id).await?;
        send_signal(pid, Signal::Hangup)
            .map_err(|source| LifecycleError::SignalFailed { id, source })?;
        debug!(id, pid, "reloaded radvd");
        Ok(())
    }

    async fn stop(&self, id: u32) -> Result<(), LifecycleError> {
        let pid = self.resolve_pid(id).await?;
        send_signal(pid, Signal::Terminate)
            .map_err(|source| LifecycleError::SignalFailed { id, source })?;
        self.remove_artifacts(id, true).await?;
        debug!(id, pid, "stopped radvd");
        Ok(())
    }

    async fn stop_if_running(&self, id: u32) -> Result<(), LifecycleError> {
        if let Some(pid) = self.read_pid(id).await {
            if process_exists(pid) {
                send_signal(pid, Signal::Terminate)
                    .map_err(|source| LifecycleError::SignalFailed { id, source })?;
            }
        }
        self.remove_artifacts(id, false).await
    }

    async fn discard_config(&self, id: u32) -> Result<(), LifecycleError> {
        match tokio::fs::remove_file(self.paths.conf_file(id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(LifecycleError::Io { id, source }),
        }
    }

    async fn read_pid(&self, id: u32) -> Option<u32> {
        let text = tokio::fs::read_to_string(self.paths.pid_file(id)).await.ok()?;
        text.trim().parse().ok()
    }
}

#[derive(Debug, Clone, Copy)]
enum Signal {
    Hangup,
    Terminate,
}

#[cfg(unix)]
fn send_signal(pid: u32, signal: Signal) -> std::io::Result<()> {
    let signum = match signal {
        Signal::Hangup => libc::SIGHUP,
        Signal::Terminate => libc::SIGTERM,
    };
    // SAFETY: kill with a valid signal number has no memory effects.
    let rc = unsafe { libc::kill(pid as i32, signum) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn send_signal(_pid: u32, _signal: Signal) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "signals are only supported on unix targets",
    ))
}

#[cfg(unix)]
fn process_exists(pid: u32) -> bool {
    // SAFETY: signal 0 only performs the existence/permission check.
    unsafe { libc::kill(pid as i32, 0) == 0 }
}

#[cfg(not(unix))]
fn process_exists(_pid: u32) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn test_paths(dir: &Path, binary: &str) -> RadvdPaths {
        RadvdPaths {
            conf_dir: dir.join("conf"),
            run_dir: dir.join("run"),
            binary: PathBuf::from(binary),
            host_conf: dir.join("radvd.conf"),
        }
    }

    fn sample(id: u32) -> Instance {
        Instance {
            id,
            name: "eth0".to_string(),
            adv_send_advert: true,
            ..Instance::default()
        }
    }

    #[test]
    fn artifact_names_are_pure_functions_of_id() {
        let paths = RadvdPaths::default();
        assert_eq!(paths.conf_file(7), PathBuf::from("/etc/radvd.d/7.conf"));
        assert_eq!(
            paths.pid_file(7),
            PathBuf::from("/var/run/radvd/radvd.7.pid")
        );
    }

    #[tokio::test]
    async fn render_writes_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let manager = RadvdProcessManager::new(test_paths(dir.path(), "true"));
        manager.render(&sample(3)).await.unwrap();
        let text = tokio::fs::read_to_string(manager.paths().conf_file(3))
            .await
            .unwrap();
        assert!(text.contains("interface eth0"));
    }

    #[tokio::test]
    async fn validate_maps_nonzero_exit_to_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let ok = RadvdProcessManager::new(test_paths(dir.path(), "true"));
        assert!(ok.validate(1).await.is_ok());

        let bad = RadvdProcessManager::new(test_paths(dir.path(), "false"));
        assert!(matches!(
            bad.validate(1).await.unwrap_err(),
            LifecycleError::InvalidConfig { id: 1 }
        ));
    }

    #[tokio::test]
    async fn failed_start_removes_rendered_config() {
        let dir = tempfile::tempdir().unwrap();
        let manager = RadvdProcessManager::new(test_paths(dir.path(), "false"));
        manager.render(&sample(5)).await.unwrap();

        let err = manager.start(5).await.unwrap_err();
        assert!(matches!(err, LifecycleError::StartFailed { id: 5, .. }));
        assert!(!manager.paths().conf_file(5).exists());
    }

    #[tokio::test]
    async fn reload_without_pid_file_reports_process_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let manager = RadvdProcessManager::new(test_paths(dir.path(), "true"));
        assert!(matches!(
            manager.reload(9).await.unwrap_err(),
            LifecycleError::ProcessNotFound { id: 9 }
        ));
    }

    #[tokio::test]
    async fn stale_pid_file_reports_process_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let manager = RadvdProcessManager::new(test_paths(dir.path(), "true"));

        // A reaped child's PID no longer names a live process.
        let pid = std::process::Command::new("true")
            .spawn()
            .and_then(|mut child| {
                let pid = child.id();
                child.wait().map(|_| pid)
            })
            .unwrap();
        tokio::fs::create_dir_all(&manager.paths().run_dir)
            .await
            .unwrap();
        tokio::fs::write(manager.paths().pid_file(2), format!("{pid}\n"))
            .await
            .unwrap();

        assert!(matches!(
            manager.reload(2).await.unwrap_err(),
            LifecycleError::ProcessNotFound { id: 2 }
        ));
    }

    #[tokio::test]
    async fn stop_terminates_process_and_removes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let manager = RadvdProcessManager::new(test_paths(dir.path(), "true"));
        manager.render(&sample(4)).await.unwrap();

        let child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        tokio::fs::create_dir_all(&manager.paths().run_dir)
            .await
            .unwrap();
        tokio::fs::write(manager.paths().pid_file(4), child.id().to_string())
            .await
            .unwrap();

        manager.stop(4).await.unwrap();
        assert!(!manager.paths().pid_file(4).exists());
        assert!(!manager.paths().conf_file(4).exists());
    }

    #[tokio::test]
    async fn stop_if_running_tolerates_missing_pid_file() {
        let dir = tempfile::tempdir().unwrap();
        let manager = RadvdProcessManager::new(test_paths(dir.path(), "true"));
        manager.render(&sample(6)).await.unwrap();

        manager.stop_if_running(6).await.unwrap();
        assert!(!manager.paths().conf_file(6).exists());

        // Strict stop on the same state is an error.
        manager.render(&sample(6)).await.unwrap();
        assert!(matches!(
            manager.stop(6).await.unwrap_err(),
            LifecycleError::ProcessNotFound { id: 6 }
        ));
    }

    #[tokio::test]
    async fn read_pid_parses_pid_file() {
        let dir = tempfile::tempdir().unwrap();
        let manager = RadvdProcessManager::new(test_paths(dir.path(), "true"));
        tokio::fs::create_dir_all(&manager.paths().run_dir)
            .await
            .unwrap();
        tokio::fs::write(manager.paths().pid_file(1), "1234\n")
            .await
            .unwrap();
        assert_eq!(manager.read_pid(1).await, Some(1234));
        assert_eq!(manager.read_pid(2).await, None);
    }
}
