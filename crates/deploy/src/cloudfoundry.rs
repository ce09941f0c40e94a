//! Cloud Foundry v2 REST client.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};

use crate::error::{DeployError, DeployResult};
use crate::platform::{AppState, AppStatus, PlatformClient};

/// Suffix every Cloud Foundry application address carries.
pub const APPLICATION_URL_SUFFIX: &str = ".cfapps.io";

/// Derive the application name from its address.
///
/// # Errors
///
/// Returns [`DeployError::InvalidArgument`] if the address does not end in
/// [`APPLICATION_URL_SUFFIX`].
pub fn app_name_from_address(address: &str) -> DeployResult<String> {
    match address.strip_suffix(APPLICATION_URL_SUFFIX) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(DeployError::InvalidArgument(format!(
            "Application URL '{address}' does not end in '{APPLICATION_URL_SUFFIX}'"
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct Info {
    authorization_endpoint: String,
    #[serde(default)]
    token_endpoint: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Token {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    resources: Vec<Resource>,
}

#[derive(Debug, Deserialize)]
struct Resource {
    metadata: Metadata,
    entity: AppEntity,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    guid: String,
}

#[derive(Debug, Deserialize)]
struct AppEntity {
    state: String,
}

#[derive(Debug, Deserialize)]
struct Summary {
    instances: u32,
    #[serde(default)]
    running_instances: u32,
}

/// Cloud Foundry client using UAA password-grant login.
#[derive(Debug)]
pub struct CloudFoundryClient {
    http: Client,
    target: String,
    username: String,
    password: String,
    token: Option<String>,
}

impl CloudFoundryClient {
    /// Create a client for the API at `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(target: &str, username: &str, password: &str) -> DeployResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(300))
            .user_agent(format!("tweetstore-deploy/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            target: target.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            token: None,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> DeployResult<RequestBuilder> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| DeployError::IllegalState("not logged in".to_string()))?;
        Ok(request.bearer_auth(token))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> DeployResult<T> {
        let request = self.authorized(self.http.get(format!("{}{path}", self.target)))?;
        parse(request.send().await?).await
    }

    async fn find_app(&self, app: &str) -> DeployResult<Resource> {
        let request = self
            .authorized(self.http.get(format!("{}/v2/apps", self.target)))?
            .query(&[("q", format!("name:{app}"))]);
        let page: Page = parse(request.send().await?).await?;
        page.resources.into_iter().next().ok_or_else(|| DeployError::Api {
            status: 404,
            message: format!("application '{app}' not found"),
        })
    }

    async fn set_state(&self, app: &str, state: &str) -> DeployResult<()> {
        let guid = self.find_app(app).await?.metadata.guid;
        let request = self
            .authorized(self.http.put(format!("{}/v2/apps/{guid}", self.target)))?
            .json(&json!({ "state": state }));
        check(request.send().await?).await?;
        debug!(app, state, "Changed application state");
        Ok(())
    }
}

#[async_trait]
impl PlatformClient for CloudFoundryClient {
    async fn login(&mut self) -> DeployResult<()> {
        let info: Info = parse(
            self.http
                .get(format!("{}/v2/info", self.target))
                .send()
                .await?,
        )
        .await?;
        let uaa = info
            .token_endpoint
            .unwrap_or(info.authorization_endpoint);

        let response = self
            .http
            .post(format!("{}/oauth/token", uaa.trim_end_matches('/')))
            .basic_auth("cf", Some(""))
            .form(&[
                ("grant_type", "password"),
                ("username", self.username.as_str()),
                ("password", self.password.as_str()),
            ])
            .send()
            .await?;
        let token: Token = parse(response).await?;

        self.token = Some(token.access_token);
        info!(target = %self.target, user = %self.username, "Logged in to Cloud Foundry");
        Ok(())
    }

    async fn logout(&mut self) -> DeployResult<()> {
        self.token = None;
        Ok(())
    }

    async fn upload(&self, app: &str, archive: &Path) -> DeployResult<()> {
        let guid = self.find_app(app).await?.metadata.guid;
        let bytes = tokio::fs::read(archive).await?;
        let file_name = archive
            .file_name()
            .map_or_else(|| "application.zip".to_string(), |n| n.to_string_lossy().into_owned());

        let form = Form::new().text("resources", "[]").part(
            "application",
            Part::bytes(bytes)
                .file_name(file_name)
                .mime_str("application/zip")?,
        );
        let request = self
            .authorized(self.http.put(format!("{}/v2/apps/{guid}/bits", self.target)))?
            .multipart(form);
        check(request.send().await?).await?;

        info!(app, archive = %archive.display(), "Uploaded application");
        Ok(())
    }

    async fn state(&self, app: &str) -> DeployResult<AppState> {
        let state = self.find_app(app).await?.entity.state;
        Ok(match state.as_str() {
            "STOPPED" => AppState::Stopped,
            "STARTED" => AppState::Started,
            _ => AppState::Other(state),
        })
    }

    async fn start(&self, app: &str) -> DeployResult<()> {
        self.set_state(app, "STARTED").await
    }

    async fn restart(&self, app: &str) -> DeployResult<()> {
        self.set_state(app, "STOPPED").await?;
        self.set_state(app, "STARTED").await
    }

    async fn stop(&self, app: &str) -> DeployResult<()> {
        self.set_state(app, "STOPPED").await
    }

    async fn status(&self, app: &str) -> DeployResult<AppStatus> {
        let guid = self.find_app(app).await?.metadata.guid;
        let summary: Summary = self.get(&format!("/v2/apps/{guid}/summary")).await?;
        Ok(AppStatus {
            instances: summary.instances,
            running_instances: summary.running_instances,
        })
    }
}

async fn check(response: Response) -> DeployResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(DeployError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn parse<T: DeserializeOwned>(response: Response) -> DeployResult<T> {
    Ok(check(response).await?.json().await?)
}
