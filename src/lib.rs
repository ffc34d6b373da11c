pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod service;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;
