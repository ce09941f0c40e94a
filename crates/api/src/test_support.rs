//! Router fixtures shared by the route tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use tweetstore_core::storage::{ProviderContext, ProviderRegistry, StorageProvider};
use tweetstore_core::tweets::{StaticTweetSource, Tweet, TweetError, TweetService, TweetSource};
use tweetstore_platform::{QueueError, Task, TaskQueue};
use tweetstore_shared::constants::INTERNAL_TOKEN_HEADER;

use crate::{AppState, create_router};

pub(crate) const TOKEN: &str = "s3cret";

/// Queue that records tasks instead of delivering them.
#[derive(Default)]
pub(crate) struct RecordingQueue {
    tasks: Mutex<Vec<Task>>,
}

impl RecordingQueue {
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskQueue for RecordingQueue {
    fn name(&self) -> &str {
        "twitter"
    }

    async fn add(&self, task: Task) -> Result<(), QueueError> {
        self.tasks.lock().unwrap().push(task);
        Ok(())
    }

    async fn destroy(&self) {}
}

struct FailingSource;

#[async_trait]
impl TweetSource for FailingSource {
    async fn fetch_mentions(&self) -> Result<Vec<Tweet>, TweetError> {
        Err(TweetError::fetch("Twitter API error 503: Service Unavailable"))
    }
}

pub(crate) struct TestApp {
    router: Router,
    pub queue: Arc<RecordingQueue>,
    _root: TempDir,
}

impl TestApp {
    /// App with a filesystem and a transient provider and two mentions.
    pub fn new() -> Self {
        let tweets = vec![
            Tweet {
                id: "2".into(),
                text: "beans are great".into(),
                sender: "alice".into(),
                created_at: None,
            },
            Tweet {
                id: "1".into(),
                text: "I love beans!".into(),
                sender: "frank".into(),
                created_at: None,
            },
        ];
        Self::build(Arc::new(StaticTweetSource::new(tweets)))
    }

    pub fn with_failing_source() -> Self {
        Self::build(Arc::new(FailingSource))
    }

    fn build(source: Arc<dyn TweetSource>) -> Self {
        let root = tempfile::tempdir().unwrap();
        let registry = ProviderRegistry::from_contexts([
            ProviderContext::from_provider("transient", StorageProvider::Transient).unwrap(),
            ProviderContext::from_provider("filesystem", StorageProvider::local_fs(root.path()))
                .unwrap(),
        ]);
        let queue = Arc::new(RecordingQueue::default());

        let state = AppState {
            tweets: Arc::new(TweetService::new(Arc::new(registry), "tweets")),
            source,
            queue: Arc::clone(&queue) as Arc<dyn TaskQueue>,
            internal_token: Some(Arc::from(TOKEN)),
        };

        Self {
            router: create_router(state),
            queue,
            _root: root,
        }
    }

    /// Send a request and return the status with the JSON body.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(INTERNAL_TOKEN_HEADER, token);
        }

        let response = self
            .router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }
}
