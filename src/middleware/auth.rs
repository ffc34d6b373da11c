use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, MatchedPath, RawPathParams, Request, State},
    http::{request::Parts, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::auth::{AuthnService, SubjectRole};
use crate::error::ApiError;

/// Path parameters whose value must match the token subject. Applies to
/// every protected route; the admin role bypasses the check.
pub const AUTHZ_WILDCARDS: [&str; 2] = ["employeeId", "userId"];

/// Role allowed to act on resources owned by other subjects.
pub const ADMIN_ROLE: SubjectRole = SubjectRole::Manager;

/// Authenticated caller context extracted from the bearer token and injected
/// into request extensions by the authorization middleware.
#[derive(Debug, Clone)]
pub struct Principal {
    pub subject: Uuid,
    pub roles: Vec<SubjectRole>,
}

impl Principal {
    pub fn has_role(&self, role: SubjectRole) -> bool {
        self.roles.contains(&role)
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Missing authenticated principal"))
    }
}

/// Explicit allow-list: route template and verb to the roles permitted to
/// call it. A route absent from the map is rejected, never allowed through;
/// public routes carry an empty role list and forward without credentials.
#[derive(Debug, Default)]
pub struct AuthzConfig {
    role_map: HashMap<(Method, String), Vec<SubjectRole>>,
}

impl AuthzConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, method: Method, route: &str, roles: &[SubjectRole]) -> Self {
        self.role_map.insert((method, route.to_string()), roles.to_vec());
        self
    }

    pub fn public(self, method: Method, route: &str) -> Self {
        self.require(method, route, &[])
    }

    fn required_roles(&self, method: &Method, route: &str) -> Option<&[SubjectRole]> {
        self.role_map
            .get(&(method.clone(), route.to_string()))
            .map(Vec::as_slice)
    }
}

/// Responses produced when a request is rejected, injectable so transports
/// can match their own response conventions.
#[derive(Clone)]
pub struct RejectionHandlers {
    pub on_unauthorized: fn() -> Response,
    pub on_forbidden: fn() -> Response,
    pub on_internal_error: fn() -> Response,
}

impl Default for RejectionHandlers {
    fn default() -> Self {
        Self {
            on_unauthorized: || ApiError::unauthorized("Missing or invalid credentials").into_response(),
            on_forbidden: || ApiError::forbidden("Insufficient permissions").into_response(),
            on_internal_error: || {
                ApiError::internal_server_error("An error occurred while processing your request").into_response()
            },
        }
    }
}

/// Everything the authorization middleware needs, shared across requests.
pub struct AuthzLayer {
    pub authn: Arc<AuthnService>,
    pub config: AuthzConfig,
    pub handlers: RejectionHandlers,
}

/// Token-based authorization middleware.
///
/// Verifies the bearer token, checks the caller's roles against the role map
/// entry for the matched route, enforces wildcard ownership, and injects the
/// [`Principal`] for downstream extractors. Handlers behind this middleware
/// never see an unauthenticated request.
pub async fn authorize_middleware(State(authz): State<Arc<AuthzLayer>>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let Some(matched) = parts.extensions.get::<MatchedPath>().cloned() else {
        tracing::error!(path = %parts.uri.path(), "authz: request did not match a routed path");
        return (authz.handlers.on_internal_error)();
    };

    let Some(required) = authz.config.required_roles(&parts.method, matched.as_str()) else {
        // Fail closed: every routed verb must have an explicit role map entry.
        tracing::error!(route = matched.as_str(), method = %parts.method, "authz: route missing from role map");
        return (authz.handlers.on_internal_error)();
    };

    if required.is_empty() {
        return next.run(Request::from_parts(parts, body)).await;
    }

    let Some(token) = bearer_token(&parts.headers) else {
        return (authz.handlers.on_unauthorized)();
    };
    let claims = match authz.authn.parse_token(token) {
        Ok(claims) => claims,
        Err(_) => return (authz.handlers.on_unauthorized)(),
    };
    let principal = Principal {
        subject: claims.sub,
        roles: claims.roles,
    };

    if !required.iter().any(|role| principal.has_role(*role)) {
        return (authz.handlers.on_forbidden)();
    }

    // Ownership: wildcard path parameters must name the token subject.
    if !principal.has_role(ADMIN_ROLE) {
        let params = match RawPathParams::from_request_parts(&mut parts, &()).await {
            Ok(params) => params,
            Err(_) => return (authz.handlers.on_internal_error)(),
        };
        let subject = principal.subject.to_string();
        // The innermost (last) ownership parameter identifies the resource.
        let owner = params
            .iter()
            .filter(|(name, value)| AUTHZ_WILDCARDS.contains(name) && !value.is_empty())
            .last()
            .map(|(_, value)| value);
        if let Some(owner) = owner {
            if owner != subject {
                return (authz.handlers.on_forbidden)();
            }
        }
    }

    parts.extensions.insert(principal);
    next.run(Request::from_parts(parts, body)).await
}

/// Token of a `Bearer` Authorization header, if present and well-formed.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_requires_the_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert("authorization", "Basic dXNlcjpwYXNz".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert("authorization", "Bearer ".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.remove("authorization");
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn role_map_lookup_is_exact() {
        let config = AuthzConfig::new().require(Method::GET, "/users/:userId", &[SubjectRole::User]);

        assert!(config.required_roles(&Method::GET, "/users/:userId").is_some());
        assert!(config.required_roles(&Method::DELETE, "/users/:userId").is_none());
        assert!(config.required_roles(&Method::GET, "/users").is_none());
    }
}
