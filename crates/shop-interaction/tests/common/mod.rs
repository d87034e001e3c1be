#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Value, json};
use shop_core::user::{MemoryTokenStore, SessionStore};
use shop_interaction::{
    ApiResponse, AuthenticatedRequestGateway, HttpTransport, OutgoingRequest, RefreshPolicy,
    RequestError,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A request as seen by the fake server.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

pub struct Reply {
    pub result: Result<ApiResponse, RequestError>,
    pub delay: Duration,
}

impl Reply {
    pub fn ok(result: Value) -> Self {
        Self {
            result: Ok(ApiResponse::new(
                200,
                json!({ "success": true, "message": "", "result": result }),
            )),
            delay: Duration::ZERO,
        }
    }

    pub fn err(error: RequestError) -> Self {
        Self {
            result: Err(error),
            delay: Duration::ZERO,
        }
    }

    pub fn after(mut self, millis: u64) -> Self {
        self.delay = Duration::from_millis(millis);
        self
    }
}

pub fn expired() -> RequestError {
    RequestError::server(
        401,
        json!({ "success": false, "message": "userTokenExpired" }),
    )
}

pub fn server_error(status: u16, message: &str) -> RequestError {
    RequestError::server(status, json!({ "success": false, "message": message }))
}

type Handler = dyn Fn(&Call) -> Reply + Send + Sync;

/// Transport that answers from a closure and records every call.
pub struct ScriptedTransport {
    handler: Box<Handler>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&Call) -> Reply + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.path == path)
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: &OutgoingRequest) -> Result<ApiResponse, RequestError> {
        let call = Call {
            method: request.method.clone(),
            path: request.path.clone(),
            bearer: request.bearer().map(str::to_string),
            body: request.body.clone(),
        };
        self.calls.lock().unwrap().push(call.clone());

        let reply = (self.handler)(&call);
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result
    }
}

pub async fn session_with_token(token: &str) -> (SessionStore, Arc<MemoryTokenStore>) {
    let token_store = Arc::new(MemoryTokenStore::with_token(token));
    let session = SessionStore::restore(token_store.clone()).await.unwrap();
    (session, token_store)
}

pub fn gateway(
    transport: Arc<ScriptedTransport>,
    session: SessionStore,
    policy: RefreshPolicy,
) -> AuthenticatedRequestGateway {
    AuthenticatedRequestGateway::new(transport, session, policy)
}

/// Server where `valid` is the only accepted token and refresh hands out `next`.
pub fn rotating_server(valid: &'static str, next: &'static str) -> Arc<ScriptedTransport> {
    ScriptedTransport::new(move |call| {
        if call.path == "/user/refresh" {
            return Reply::ok(json!(next));
        }
        match call.bearer.as_deref() {
            Some(token) if token == valid || token == next => {
                Reply::ok(json!({ "path": call.path, "token": token }))
            }
            _ => Reply::err(expired()),
        }
    })
}
