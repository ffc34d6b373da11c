pub mod auth;

pub use auth::{authorize_middleware, AuthzConfig, AuthzLayer, Principal, RejectionHandlers, ADMIN_ROLE, AUTHZ_WILDCARDS};
