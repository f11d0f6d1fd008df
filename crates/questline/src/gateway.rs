//! In-process request router in front of [`AuthService`].
//!
//! Stands where the real HTTP layer would: it decodes request bodies,
//! calls the auth service, and renders [`AuthError`] as a status code.
//! It implements [`Transport`], so a [`RefreshCoordinator`] can talk to it
//! directly.
//!
//! [`RefreshCoordinator`]: questline_session::RefreshCoordinator

use std::collections::HashMap;
use std::sync::Arc;

use questline_auth::{AuthError, AuthService};
use questline_protocol::{
    ApiRequest, ApiResponse, Identity, JsonCodec, LoginRequest, Method, RefreshRequest,
    AUTHORIZATION_HEADER, LOGIN_PATH, PROFILE_PATH, REFRESH_PATH,
};
use questline_session::{Transport, TransportError};
use serde::Serialize;

/// Handler for a protected route. Only called once the caller's access
/// token has been validated.
pub type RouteHandler = Arc<dyn Fn(&Identity, &ApiRequest) -> ApiResponse + Send + Sync>;

/// Error body, shaped like the browser client expects.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    status_code: u16,
    message: String,
}

/// Routes the auth endpoints plus any registered protected routes.
///
/// ```text
/// POST /auth/login    LoginRequest   → 200 TokenPair | 401
/// POST /auth/refresh  RefreshRequest → 200 TokenPair | 401
/// GET  /auth/profile  bearer         → 200 Identity  | 401
/// <registered>        bearer         → handler       | 401
/// anything else                      → 404
/// ```
#[derive(Clone)]
pub struct Gateway {
    auth: AuthService,
    codec: JsonCodec,
    routes: HashMap<(Method, String), RouteHandler>,
}

impl Gateway {
    pub fn new(auth: AuthService) -> Self {
        Self {
            auth,
            codec: JsonCodec,
            routes: HashMap::new(),
        }
    }

    /// Registers a protected route.
    pub fn route<F>(mut self, method: Method, path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Identity, &ApiRequest) -> ApiResponse + Send + Sync + 'static,
    {
        self.routes.insert((method, path.into()), Arc::new(handler));
        self
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Produces the response for one request. Never fails: every problem
    /// becomes a status code.
    pub fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let path = request.path.split('?').next().unwrap_or_default();
        tracing::debug!(method = %request.method, path, "gateway request");

        match (request.method, path) {
            (Method::Post, LOGIN_PATH) => self.login(request),
            (Method::Post, REFRESH_PATH) => self.refresh(request),
            (Method::Get, PROFILE_PATH) => {
                self.authorized(request, |identity, _| self.respond(ApiResponse::OK, identity))
            }
            (method, path) => match self.routes.get(&(method, path.to_string())) {
                Some(handler) => self.authorized(request, |identity, req| handler(identity, req)),
                None => self.error(ApiResponse::NOT_FOUND, format!("no route for {method} {path}")),
            },
        }
    }

    fn login(&self, request: &ApiRequest) -> ApiResponse {
        let login: LoginRequest = match request.decode_body(&self.codec) {
            Ok(login) => login,
            Err(e) => return self.bad_request(&e),
        };
        match self.auth.login(&login) {
            Ok(pair) => self.respond(ApiResponse::OK, &pair),
            Err(e) => self.auth_error(&e),
        }
    }

    fn refresh(&self, request: &ApiRequest) -> ApiResponse {
        let refresh: RefreshRequest = match request.decode_body(&self.codec) {
            Ok(refresh) => refresh,
            Err(e) => return self.bad_request(&e),
        };
        match self.auth.refresh(&refresh) {
            Ok(pair) => self.respond(ApiResponse::OK, &pair),
            Err(e) => self.auth_error(&e),
        }
    }

    fn authorized<F>(&self, request: &ApiRequest, handler: F) -> ApiResponse
    where
        F: FnOnce(&Identity, &ApiRequest) -> ApiResponse,
    {
        match self.auth.authorize(request.header(AUTHORIZATION_HEADER)) {
            Ok(identity) => handler(&identity, request),
            Err(e) => self.auth_error(&e),
        }
    }

    fn respond<T: Serialize>(&self, status: u16, value: &T) -> ApiResponse {
        ApiResponse::encoded(status, &self.codec, value).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to encode response");
            ApiResponse::status(ApiResponse::INTERNAL_ERROR)
        })
    }

    fn error(&self, status: u16, message: String) -> ApiResponse {
        self.respond(
            status,
            &ErrorBody {
                status_code: status,
                message,
            },
        )
    }

    fn auth_error(&self, error: &AuthError) -> ApiResponse {
        if let AuthError::Issue(e) = error {
            tracing::error!(error = %e, "token issuance failed");
        }
        self.error(error.status(), error.to_string())
    }

    fn bad_request(&self, error: &questline_protocol::ProtocolError) -> ApiResponse {
        tracing::debug!(error = %error, "undecodable request body");
        self.error(ApiResponse::BAD_REQUEST, error.to_string())
    }
}

impl Transport for Gateway {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        Ok(self.handle(&request))
    }
}
