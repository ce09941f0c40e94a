//! Twitter REST API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use tweetstore_core::tweets::{Tweet, TweetError, TweetSource};
use tweetstore_shared::TwitterSettings;

use crate::error::{TwitterError, TwitterResult};
use crate::oauth::OAuthSigner;
use crate::types::{ErrorResponse, TwitterResponse, TwitterTweet};

/// Twitter REST API client for one account's mentions.
#[derive(Debug)]
pub struct TwitterClient {
    client: Client,
    base_url: String,
    user_id: String,
    oauth_signer: OAuthSigner,
}

impl TwitterClient {
    /// Create a client from settings.
    ///
    /// # Errors
    ///
    /// Returns [`TwitterError::Config`] when a credential or the user id is
    /// missing, or an HTTP error if the client cannot be built.
    pub fn new(settings: &TwitterSettings) -> TwitterResult<Self> {
        let required = [
            ("consumer_key", &settings.consumer_key),
            ("consumer_secret", &settings.consumer_secret),
            ("access_token", &settings.access_token),
            ("access_token_secret", &settings.access_token_secret),
            ("user_id", &settings.user_id),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(TwitterError::Config(format!("twitter.{field} is required")));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(format!("tweetstore/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            user_id: settings.user_id.clone(),
            oauth_signer: OAuthSigner::new(settings),
        })
    }

    /// Fetch the most recent mentions of the configured account.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn mentions(&self) -> TwitterResult<Vec<Tweet>> {
        let endpoint = format!("/2/users/{}/mentions", self.user_id);
        let params = vec![
            ("expansions".to_string(), "author_id".to_string()),
            ("tweet.fields".to_string(), "created_at".to_string()),
        ];

        let response: TwitterResponse<Vec<TwitterTweet>> =
            self.get_with_params(&endpoint, &params).await?;
        let tweets = response.into_tweets();
        debug!(count = tweets.len(), "Fetched mentions");
        Ok(tweets)
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> TwitterResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(endpoint, "Making Twitter API request");

        let auth_header = self.oauth_signer.sign("GET", &url, params)?;
        let response = self
            .client
            .get(&url)
            .query(params)
            .header("Authorization", auth_header)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> TwitterResult<T> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            return serde_json::from_slice(&bytes).map_err(TwitterError::from);
        }

        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap_or_default();
        let message = body
            .detail
            .or(body.title)
            .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned());

        Err(TwitterError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl TweetSource for TwitterClient {
    async fn fetch_mentions(&self) -> Result<Vec<Tweet>, TweetError> {
        Ok(self.mentions().await?)
    }
}
