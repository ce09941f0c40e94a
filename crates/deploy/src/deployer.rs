//! Deploy, start, and wait for an application on a hosting platform.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::error::{DeployError, DeployResult};
use crate::platform::{AppState, PlatformClient};

/// Number of status polls before giving up on start-up.
pub const MAX_STATUS_CHECKS: u32 = 20;

/// Drives one application through deploy, start-up polling, and stop.
#[derive(Debug)]
pub struct Deployer<C> {
    client: C,
    app: String,
    poll_interval: Duration,
    deployed: bool,
}

impl<C: PlatformClient> Deployer<C> {
    /// Create a deployer for `app`, polling once per second.
    pub fn new(client: C, app: impl Into<String>) -> Self {
        Self {
            client,
            app: app.into(),
            poll_interval: Duration::from_secs(1),
            deployed: false,
        }
    }

    /// Override the delay between status polls.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Application name.
    pub fn app(&self) -> &str {
        &self.app
    }

    /// Log in, upload and start `archive`, wait for every instance, and log out.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::UnexpectedState`] when the application is neither
    /// stopped nor started after upload, [`DeployError::Timeout`] when it does
    /// not come up, or any platform error.
    pub async fn deploy_and_wait(&mut self, archive: &Path) -> DeployResult<()> {
        self.client.login().await?;
        self.deploy(archive).await?;
        self.wait_for_instance().await?;
        self.client.logout().await
    }

    /// Upload `archive`, then start a stopped application or restart a running one.
    #[instrument(skip(self), fields(app = %self.app))]
    pub async fn deploy(&mut self, archive: &Path) -> DeployResult<()> {
        self.client.upload(&self.app, archive).await?;
        self.deployed = true;

        match self.client.state(&self.app).await? {
            AppState::Stopped => {
                info!("Starting application");
                self.client.start(&self.app).await
            }
            AppState::Started => {
                info!("Restarting application");
                self.client.restart(&self.app).await
            }
            other => Err(DeployError::UnexpectedState(other.to_string())),
        }
    }

    /// Poll until running instances match desired instances.
    ///
    /// Checks at most [`MAX_STATUS_CHECKS`] times, sleeping between checks.
    #[instrument(skip(self), fields(app = %self.app))]
    pub async fn wait_for_instance(&self) -> DeployResult<()> {
        for check in 1..=MAX_STATUS_CHECKS {
            let status = self.client.status(&self.app).await?;
            if status.is_running() {
                info!(checks = check, instances = status.instances, "Application started");
                return Ok(());
            }
            debug!(
                check,
                running = status.running_instances,
                desired = status.instances,
                "Waiting for instances"
            );
            tokio::time::sleep(self.poll_interval).await;
        }

        Err(DeployError::Timeout {
            app: self.app.clone(),
            checks: MAX_STATUS_CHECKS,
        })
    }

    /// Stop the deployed application.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::IllegalState`] if nothing was deployed yet.
    pub async fn stop(&mut self) -> DeployResult<()> {
        if !self.deployed {
            return Err(DeployError::IllegalState(
                "'stop' called before 'deploy'".to_string(),
            ));
        }
        self.client.login().await?;
        self.client.stop(&self.app).await?;
        info!(app = %self.app, "Application stopped");
        self.client.logout().await
    }

    /// Mark the application as already deployed, for stopping one deployed by
    /// an earlier run.
    #[must_use]
    pub fn assume_deployed(mut self) -> Self {
        self.deployed = true;
        self
    }
}
