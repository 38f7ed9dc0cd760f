//! HTTP inbound adapter exposing the notes UI and JSON endpoints.

pub mod error;
pub mod health;
pub mod notes;
pub mod pages;
pub mod routes;
pub mod schemas;
pub mod state;
pub mod validation;

pub use error::ApiResult;
