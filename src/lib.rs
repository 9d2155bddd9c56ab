//! Linkpulse - URL shortener with per-visit click analytics
//!
//! # Architecture
//! - `cache`: cache-aside resolution layer (redis / moka / null)
//! - `repository`: storage traits and backends (sea-orm / memory)
//! - `services`: creation flow, redirect resolution, visit recording,
//!   analytics rollups, GeoIP
//! - `api`: HTTP handlers and identity extraction
//! - `config`: configuration loading

pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod repository;
pub mod services;
pub mod utils;
