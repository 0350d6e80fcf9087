//! Scripted transport for tests.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    rc::Rc,
};

use serde_json::Value;

use crate::error::Result;

use super::{Method, Request, Response, Transport};

pub(crate) const BASE_URL: &str = "http://mock.test";

/// Transport answering from per-route queues and recording every request.
///
/// The last queued response of a route is sticky, so repeated calls keep
/// getting it. Unknown routes answer 404 with a JSON error body.
#[derive(Clone, Default)]
pub(crate) struct MockTransport {
    state: Rc<RefCell<MockState>>,
}

#[derive(Default)]
struct MockState {
    routes: HashMap<(Method, String), VecDeque<Response>>,
    requests: Vec<Request>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: &str) -> &Self {
        self.state
            .borrow_mut()
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(Response {
                status,
                body: body.to_string(),
            });
        self
    }

    pub fn respond_json(&self, method: Method, path: &str, body: Value) -> &Self {
        self.respond(method, path, 200, &body.to_string())
    }

    pub fn requests(&self) -> Vec<Request> {
        self.state.borrow().requests.clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        let url = format!("{BASE_URL}/{path}");
        self.state
            .borrow()
            .requests
            .iter()
            .filter(|request| request.method == method && request.url == url)
            .count()
    }

    /// Body of the most recent request to `path` with `method`.
    pub fn last_body(&self, method: Method, path: &str) -> Option<Value> {
        let url = format!("{BASE_URL}/{path}");
        self.state
            .borrow()
            .requests
            .iter()
            .rev()
            .find(|request| request.method == method && request.url == url)
            .and_then(|request| request.body.clone())
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &Request) -> Result<Response> {
        let mut state = self.state.borrow_mut();
        state.requests.push(request.clone());

        let path = request
            .url
            .strip_prefix(BASE_URL)
            .map(|rest| rest.trim_start_matches('/'))
            .unwrap_or(&request.url)
            .to_string();

        let response = match state.routes.get_mut(&(request.method.clone(), path)) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        Ok(response.unwrap_or_else(|| Response {
            status: 404,
            body: r#"{"error":"no route"}"#.to_string(),
        }))
    }
}
