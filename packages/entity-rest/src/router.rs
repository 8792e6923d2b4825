//! Matchit routing configuration.

use std::sync::Arc;

use hyper::{body::Bytes, Method, Request, Response};
use matchit::Router as MatchitRouter;

use crate::handlers;
use entity_store::{Registry, StoreConfig, StoreError};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Entity registry
    pub registry: Arc<Registry>,
    /// Store configuration
    pub config: Arc<StoreConfig>,
}

/// HTTP request router.
pub struct Router {
    inner: MatchitRouter<RouteHandler>,
    state: AppState,
}

impl Router {
    /// Creates a new router with the entity API routes.
    pub fn new(registry: Arc<Registry>, config: Arc<StoreConfig>) -> Self {
        let mut router = MatchitRouter::new();

        router
            .insert("/api/{resource}", RouteHandler::Collection)
            .expect("Failed to insert /api/{resource} route");
        router
            .insert("/api/{resource}/count", RouteHandler::Count)
            .expect("Failed to insert /api/{resource}/count route");
        router
            .insert("/api/{resource}/{id}", RouteHandler::Item)
            .expect("Failed to insert /api/{resource}/{id} route");

        Self {
            inner: router,
            state: AppState { registry, config },
        }
    }

    /// Routes an incoming request to the appropriate handler.
    ///
    /// # Arguments
    /// * `req` - HTTP request
    ///
    /// # Returns
    /// `Result<Response<Bytes>, RouterError>` containing the response or an error.
    pub async fn route(
        &self,
        req: Request<hyper::body::Incoming>,
    ) -> Result<Response<Bytes>, RouterError> {
        let path = req.uri().path().to_string();

        match self.inner.at(&path) {
            Ok(matched) => {
                let action = resolve_action(*matched.value, req.method())?;
                action.handle(req, matched.params, self.state.clone()).await
            }
            Err(_) => {
                // Return 404 for unmatched routes
                let error_response = crate::handlers::error_response(
                    404,
                    "Not Found".to_string(),
                    Some(format!("No route found for {}", path)),
                );
                let body = serde_json::to_vec(&error_response).map_err(|e| {
                    RouterError::InternalError(format!("Failed to serialize error response: {}", e))
                })?;
                Ok(Response::builder()
                    .status(404)
                    .header("Content-Type", "application/json")
                    .body(Bytes::from(body))
                    .map_err(|e| {
                        RouterError::InternalError(format!("Failed to build response: {}", e))
                    })?)
            }
        }
    }
}

/// Matched route shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteHandler {
    /// `/api/{resource}`
    Collection,
    /// `/api/{resource}/count`
    Count,
    /// `/api/{resource}/{id}`
    Item,
}

/// Operation selected by route shape and method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteAction {
    List,
    Create,
    CountRecords,
    Read,
    Replace,
    Patch,
    Delete,
}

/// Maps a matched route and HTTP method to an operation.
///
/// Collection routes accept GET and POST only; the count route accepts GET
/// only; item routes accept GET, PUT, PATCH, and DELETE. Anything else is
/// 405 Method Not Allowed.
fn resolve_action(handler: RouteHandler, method: &Method) -> Result<RouteAction, RouterError> {
    match (handler, method) {
        (RouteHandler::Collection, &Method::GET) => Ok(RouteAction::List),
        (RouteHandler::Collection, &Method::POST) => Ok(RouteAction::Create),
        (RouteHandler::Count, &Method::GET) => Ok(RouteAction::CountRecords),
        (RouteHandler::Item, &Method::GET) => Ok(RouteAction::Read),
        (RouteHandler::Item, &Method::PUT) => Ok(RouteAction::Replace),
        (RouteHandler::Item, &Method::PATCH) => Ok(RouteAction::Patch),
        (RouteHandler::Item, &Method::DELETE) => Ok(RouteAction::Delete),
        _ => Err(RouterError::MethodNotAllowed),
    }
}

impl RouteAction {
    /// Handles a request with the given route parameters.
    async fn handle(
        self,
        req: Request<hyper::body::Incoming>,
        params: matchit::Params<'_, '_>,
        state: AppState,
    ) -> Result<Response<Bytes>, RouterError> {
        match self {
            RouteAction::List => handlers::list_records(req, params, state).await,
            RouteAction::Create => handlers::create_record(req, params, state).await,
            RouteAction::CountRecords => handlers::count_records(req, params, state).await,
            RouteAction::Read => handlers::read_record(req, params, state).await,
            RouteAction::Replace => handlers::replace_record(req, params, state).await,
            RouteAction::Patch => handlers::patch_record(req, params, state).await,
            RouteAction::Delete => handlers::delete_record(req, params, state).await,
        }
    }
}

/// Router error type.
#[derive(Debug)]
pub enum RouterError {
    MethodNotAllowed,
    InternalError(String),
    Timeout,
    BadRequest(String),
    NotFound(String),
}

impl std::fmt::Display for RouterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterError::MethodNotAllowed => write!(f, "Method Not Allowed"),
            RouterError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
            RouterError::Timeout => write!(f, "Request Timeout"),
            RouterError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            RouterError::NotFound(msg) => write!(f, "Not Found: {}", msg),
        }
    }
}

impl std::error::Error for RouterError {}

impl From<StoreError> for RouterError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ResourceNotFound { .. } | StoreError::RecordNotFound { .. } => {
                RouterError::NotFound(e.to_string())
            }
            StoreError::IdentityConflict { .. }
            | StoreError::Validation { .. }
            | StoreError::InvalidId { .. }
            | StoreError::Criteria(_)
            | StoreError::InvalidSort { .. } => RouterError::BadRequest(e.to_string()),
            other => RouterError::InternalError(format!("Store error: {}", other)),
        }
    }
}

impl From<RouterError> for Response<Bytes> {
    fn from(err: RouterError) -> Self {
        let (status, message) = match &err {
            RouterError::MethodNotAllowed => (405, "Method Not Allowed"),
            RouterError::InternalError(msg) => (500, msg.as_str()),
            RouterError::Timeout => (408, "Request Timeout"),
            RouterError::BadRequest(msg) => (400, msg.as_str()),
            RouterError::NotFound(msg) => (404, msg.as_str()),
        };

        let error_response = crate::handlers::error_response(status, message.to_string(), None);
        let body = serde_json::to_vec(&error_response)
            .unwrap_or_else(|e| format!("{{\"success\":false,\"error\":{{\"code\":\"500\",\"message\":\"Failed to serialize error: {}\",\"details\":null}}}}", e).into_bytes());

        Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Bytes::from(body))
            .unwrap_or_else(|_| {
                Response::builder()
                    .status(500)
                    .body(Bytes::from("Internal Server Error"))
                    .expect("Failed to build fallback error response")
            })
    }
}
