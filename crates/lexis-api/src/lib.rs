pub mod auth;
pub mod catalog;
pub mod completeness;
pub mod entities;
pub mod error;
pub mod extract;
pub mod interactions;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod translations;
pub mod words;

pub use routes::router;
pub use state::{AppState, AppStateInner};
