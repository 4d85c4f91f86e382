//! In-process catalog transport for tests.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

use super::{classify_status, CatalogError, CatalogTransport};

#[derive(Clone)]
enum Reply {
    Json(Value),
    Status(StatusCode),
}

/// Serves canned payloads keyed by URL; unknown URLs answer 404.
///
/// Each URL holds a queue of replies. The last one repeats forever.
#[derive(Default)]
pub struct StubTransport {
    replies: Mutex<HashMap<String, Vec<Reply>>>,
    requests: Mutex<Vec<String>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, body: Value) {
        self.set(url, vec![Reply::Json(body)]);
    }

    pub fn respond_status(&self, url: &str, status: u16) {
        self.set(url, vec![Reply::Status(StatusCode::from_u16(status).unwrap())]);
    }

    /// Answer with each status in turn, then with `body` from then on
    pub fn respond_after_failures(&self, url: &str, statuses: &[u16], body: Value) {
        let mut replies: Vec<Reply> = statuses
            .iter()
            .map(|status| Reply::Status(StatusCode::from_u16(*status).unwrap()))
            .collect();
        replies.push(Reply::Json(body));
        self.set(url, replies);
    }

    fn set(&self, url: &str, replies: Vec<Reply>) {
        self.replies.lock().unwrap().insert(url.to_string(), replies);
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogTransport for StubTransport {
    async fn get_json(&self, url: &str) -> Result<Value, CatalogError> {
        self.requests.lock().unwrap().push(url.to_string());

        let reply = {
            let mut replies = self.replies.lock().unwrap();
            match replies.get_mut(url) {
                Some(queue) if queue.len() > 1 => Some(queue.remove(0)),
                Some(queue) => queue.last().cloned(),
                None => None,
            }
        };

        match reply {
            Some(Reply::Json(body)) => Ok(body),
            Some(Reply::Status(status)) => Err(classify_status(status).unwrap_or_else(|| {
                CatalogError::MalformedResponse(format!("status {} has no body", status))
            })),
            None => Err(CatalogError::NotFound(url.to_string())),
        }
    }
}

/// A catalog manga entry in the provider's shape
pub fn manga_json(id: u64, title: &str) -> Value {
    json!({
        "mal_id": id,
        "url": format!("https://myanimelist.net/manga/{}", id),
        "images": {
            "jpg": { "image_url": format!("https://cdn.myanimelist.net/images/manga/{}.jpg", id) }
        },
        "title": title,
        "synopsis": format!("Synopsis of {}", title),
        "status": "Finished",
        "score": 8.5,
        "genres": [
            { "mal_id": 1, "type": "manga", "name": "Action" },
            { "mal_id": 8, "type": "manga", "name": "Drama" }
        ]
    })
}
