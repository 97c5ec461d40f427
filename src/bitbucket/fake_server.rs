//! In-process stand-in for a Bitbucket Server instance.
//!
//! Routes are matched on method and exact path; every request is recorded so
//! tests can assert on query strings, headers, bodies and call counts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::Response;
use axum::Router;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::bitbucket::client::BitbucketClient;
use crate::config::BitbucketConfig;

pub(crate) const TOKEN: &str = "test-token";

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    content_type: &'static str,
    headers: Vec<(&'static str, String)>,
    body: String,
}

#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body should be JSON")
    }
}

#[derive(Default)]
struct FakeState {
    routes: Mutex<HashMap<(Method, String), Canned>>,
    requests: Mutex<Vec<Recorded>>,
}

pub(crate) struct FakeBitbucket {
    pub url: String,
    state: Arc<FakeState>,
    _handle: tokio::task::JoinHandle<()>,
}

impl FakeBitbucket {
    pub async fn spawn() -> Self {
        let state = Arc::new(FakeState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url,
            state,
            _handle: handle,
        }
    }

    pub fn client(&self) -> BitbucketClient {
        let config = BitbucketConfig::new(&self.url, TOKEN).unwrap();
        BitbucketClient::new(config).unwrap()
    }

    /// Serve JSON at `path` (full path, including the REST root).
    pub fn json(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.insert(method, path, Canned {
            status,
            content_type: "application/json",
            headers: vec![],
            body: body.to_string(),
        });
    }

    pub fn text(&self, method: Method, path: &str, status: StatusCode, body: &str) {
        self.insert(method, path, Canned {
            status,
            content_type: "text/plain",
            headers: vec![],
            body: body.to_string(),
        });
    }

    pub fn empty(&self, method: Method, path: &str, status: StatusCode) {
        self.insert(method, path, Canned {
            status,
            content_type: "text/plain",
            headers: vec![],
            body: String::new(),
        });
    }

    /// Answer `/application-properties`, optionally naming the caller.
    pub fn identity(&self, username: Option<&str>) {
        let headers = username
            .map(|u| vec![("x-ausername", u.to_string())])
            .unwrap_or_default();
        self.insert(Method::GET, &api("/application-properties"), Canned {
            status: StatusCode::OK,
            content_type: "application/json",
            headers,
            body: json!({"version": "8.9.0", "displayName": "Bitbucket"}).to_string(),
        });
    }

    fn insert(&self, method: Method, path: &str, canned: Canned) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), canned);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("no request recorded")
    }
}

/// Prefix a path with the core REST root.
pub(crate) fn api(path: &str) -> String {
    format!("/rest/api/latest{path}")
}

/// Prefix a path with the comment-likes REST root.
pub(crate) fn likes(path: &str) -> String {
    format!("/rest/comment-likes/latest{path}")
}

async fn handle(
    State(state): State<Arc<FakeState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    });

    let canned = state
        .routes
        .lock()
        .unwrap()
        .get(&(method.clone(), path.clone()))
        .cloned();

    let canned = canned.unwrap_or_else(|| Canned {
        status: StatusCode::NOT_FOUND,
        content_type: "application/json",
        headers: vec![],
        body: json!({"errors": [{"message": format!("No route for {method} {path}")}]})
            .to_string(),
    });

    let mut builder = Response::builder()
        .status(canned.status)
        .header("content-type", canned.content_type);
    for (name, value) in canned.headers {
        builder = builder.header(name, value);
    }
    builder.body(Body::from(canned.body)).unwrap()
}
