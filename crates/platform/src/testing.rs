//! Local HTTP server that records internal requests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
};
use tweetstore_shared::constants::INTERNAL_TOKEN_HEADER;

#[derive(Debug, Clone)]
pub(crate) struct Hit {
    pub path: String,
    pub query: Option<String>,
    pub token: Option<String>,
}

pub(crate) struct Recorder {
    pub base_url: String,
    hits: Arc<Mutex<Vec<Hit>>>,
}

async fn record(State(hits): State<Arc<Mutex<Vec<Hit>>>>, req: Request) -> StatusCode {
    let hit = Hit {
        path: req.uri().path().to_string(),
        query: req.uri().query().map(String::from),
        token: req
            .headers()
            .get(INTERNAL_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    };
    let failed = hit.path == "/fail";
    hits.lock().unwrap().push(hit);
    if failed {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

impl Recorder {
    pub async fn serve() -> Self {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new().fallback(record).with_state(Arc::clone(&hits));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            base_url: format!("http://{addr}"),
            hits,
        }
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }

    /// Wait up to five seconds for at least `count` requests.
    pub async fn wait_for(&self, count: usize) -> Vec<Hit> {
        for _ in 0..100 {
            let hits = self.hits();
            if hits.len() >= count {
                return hits;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("expected {count} requests, got {}", self.hits().len());
    }
}
