//! CloudBees RUN@cloud API client.
//!
//! Every call is a signed parameter set: the request parameters sorted by
//! name, concatenated as `name` + `value`, followed by the API secret, and
//! hashed with MD5.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{DeployError, DeployResult};
use crate::platform::{AppState, AppStatus, PlatformClient};

/// Default API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.cloudbees.com/api";

/// CloudBees client authenticated with an API key and secret.
#[derive(Debug)]
pub struct CloudBeesClient {
    http: Client,
    api_url: String,
    api_key: String,
    secret: String,
}

impl CloudBeesClient {
    /// Create a client for the API at `api_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_url: &str, api_key: &str, secret: &str) -> DeployResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(300))
            .user_agent(format!("tweetstore-deploy/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            secret: secret.to_string(),
        })
    }

    /// Parameters for `action`, including the signature.
    fn signed_params(
        &self,
        action: &str,
        extra: &[(&str, &str)],
        timestamp: u64,
    ) -> BTreeMap<String, String> {
        let mut params: BTreeMap<String, String> = extra
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        params.insert("action".into(), action.into());
        params.insert("api_key".into(), self.api_key.clone());
        params.insert("format".into(), "json".into());
        params.insert("timestamp".into(), timestamp.to_string());
        params.insert("v".into(), "1.0".into());

        let sig = signature(&params, &self.secret);
        params.insert("sig".into(), sig);
        params
    }

    async fn call(&self, action: &str, app: &str) -> DeployResult<Value> {
        let params = self.signed_params(action, &[("app_id", app)], now()?);
        debug!(action, app, "Calling CloudBees API");
        let response = self.http.post(&self.api_url).form(&params).send().await?;
        parse(response).await
    }
}

/// MD5 over the sorted `name` + `value` pairs followed by the secret.
pub fn signature(params: &BTreeMap<String, String>, secret: &str) -> String {
    let mut input = String::new();
    for (name, value) in params {
        input.push_str(name);
        input.push_str(value);
    }
    input.push_str(secret);
    format!("{:x}", md5::compute(input.as_bytes()))
}

fn now() -> DeployResult<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| DeployError::IllegalState(format!("system clock before epoch: {e}")))
}

async fn parse(response: reqwest::Response) -> DeployResult<Value> {
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    if status.is_success() {
        return Ok(body);
    }
    let message = find_str(&body, "message").unwrap_or("request failed").to_string();
    Err(DeployError::Api {
        status: status.as_u16(),
        message,
    })
}

/// First string value stored under `key`, searching nested objects.
fn find_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    match value {
        Value::Object(map) => map
            .get(key)
            .and_then(Value::as_str)
            .or_else(|| map.values().find_map(|v| find_str(v, key))),
        _ => None,
    }
}

#[async_trait]
impl PlatformClient for CloudBeesClient {
    async fn login(&mut self) -> DeployResult<()> {
        // Requests are signed individually; there is no session.
        Ok(())
    }

    async fn logout(&mut self) -> DeployResult<()> {
        Ok(())
    }

    async fn upload(&self, app: &str, archive: &Path) -> DeployResult<()> {
        let params = self.signed_params(
            "application.deployArchive",
            &[("app_id", app), ("archive_type", "zip")],
            now()?,
        );
        let bytes = tokio::fs::read(archive).await?;
        let file_name = archive
            .file_name()
            .map_or_else(|| "application.zip".to_string(), |n| n.to_string_lossy().into_owned());

        let form = params
            .into_iter()
            .fold(Form::new(), |form, (k, v)| form.text(k, v))
            .part("archive", Part::bytes(bytes).file_name(file_name));
        let response = self.http.post(&self.api_url).multipart(form).send().await?;
        parse(response).await?;

        info!(app, archive = %archive.display(), "Uploaded application");
        Ok(())
    }

    async fn state(&self, app: &str) -> DeployResult<AppState> {
        let info = self.call("application.info", app).await?;
        Ok(match find_str(&info, "status") {
            Some("stopped") => AppState::Stopped,
            Some("active") => AppState::Started,
            Some(other) => AppState::Other(other.to_string()),
            None => AppState::Other("unknown".to_string()),
        })
    }

    async fn start(&self, app: &str) -> DeployResult<()> {
        self.call("application.start", app).await.map(|_| ())
    }

    async fn restart(&self, app: &str) -> DeployResult<()> {
        self.call("application.restart", app).await.map(|_| ())
    }

    async fn stop(&self, app: &str) -> DeployResult<()> {
        self.call("application.stop", app).await.map(|_| ())
    }

    /// CloudBees reports no instance counts; an active application counts as
    /// one running instance.
    async fn status(&self, app: &str) -> DeployResult<AppStatus> {
        let running = self.state(app).await? == AppState::Started;
        Ok(AppStatus {
            instances: 1,
            running_instances: u32::from(running),
        })
    }
}
