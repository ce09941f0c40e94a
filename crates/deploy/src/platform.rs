//! Hosting platform contract.

use std::fmt;
use std::path::Path;

use async_trait::async_trait;

use crate::error::DeployResult;

/// Lifecycle state of a deployed application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Deployed but not running.
    Stopped,
    /// Running.
    Started,
    /// Any state deploy does not act on, as reported by the platform.
    Other(String),
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => f.write_str("STOPPED"),
            Self::Started => f.write_str("STARTED"),
            Self::Other(state) => f.write_str(state),
        }
    }
}

/// Desired and running instance counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppStatus {
    /// Desired instances.
    pub instances: u32,
    /// Instances currently running.
    pub running_instances: u32,
}

impl AppStatus {
    /// Whether every desired instance is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running_instances == self.instances
    }
}

/// Operations the deployer needs from a hosting platform.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Authenticate with the platform.
    async fn login(&mut self) -> DeployResult<()>;

    /// Drop the session.
    async fn logout(&mut self) -> DeployResult<()>;

    /// Upload a packaged archive for `app`.
    async fn upload(&self, app: &str, archive: &Path) -> DeployResult<()>;

    /// Current lifecycle state of `app`.
    async fn state(&self, app: &str) -> DeployResult<AppState>;

    /// Start a stopped application.
    async fn start(&self, app: &str) -> DeployResult<()>;

    /// Restart a running application.
    async fn restart(&self, app: &str) -> DeployResult<()>;

    /// Stop the application.
    async fn stop(&self, app: &str) -> DeployResult<()>;

    /// Desired and running instance counts of `app`.
    async fn status(&self, app: &str) -> DeployResult<AppStatus>;
}
