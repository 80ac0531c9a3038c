//! Back end for a crypto-trading companion app: trade and position records,
//! cached price data, an LLM chat relay and Solana wallet probes.

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod persistence;
pub mod positions;
pub mod prices;
pub mod server;
pub mod types;
pub mod wallet;
