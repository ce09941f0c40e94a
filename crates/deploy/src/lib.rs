//! Deployment harness for tweetstore.
//!
//! Packages the application directory, uploads it to a hosting platform,
//! starts or restarts it, and polls until every instance is running.
//!
//! ```text
//! write_properties ─► zip_dir ─► Deployer::deploy ─► PlatformClient
//!                                       │              ├─ CloudFoundryClient
//!                                       ▼              └─ CloudBeesClient
//!                              wait_for_instance (20 × 1 s)
//! ```

pub mod archive;
pub mod cloudbees;
pub mod cloudfoundry;
pub mod deployer;
pub mod error;
pub mod platform;

pub use archive::{write_properties, zip_dir};
pub use cloudbees::CloudBeesClient;
pub use cloudfoundry::{CloudFoundryClient, app_name_from_address};
pub use deployer::{Deployer, MAX_STATUS_CHECKS};
pub use error::{DeployError, DeployResult};
pub use platform::{AppState, AppStatus, PlatformClient};
