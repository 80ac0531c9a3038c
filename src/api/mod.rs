//! HTTP surface: router, shared state, bearer auth and handlers.

pub mod auth;
pub mod chat;
pub mod portfolio;
pub mod prices;
pub mod routes;
pub mod status;
pub mod trades;
pub mod wallet;
