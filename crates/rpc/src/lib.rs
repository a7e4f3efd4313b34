//! HTTP surface for the lendtree approval classifier: train, predict,
//! and health endpoints over the shared model store.

pub mod server;

mod server_tests;

pub use server::{build_router, start_server, AppState, SharedState};
