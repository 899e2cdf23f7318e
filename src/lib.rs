//! # Chickpet - a virtual pet chick behind a small HTTP service
//!
//! One pet lives in a JSON file. It ages lazily: every request recomputes hunger, energy,
//! mess and health from the wall-clock time since the last request, moves the pet through
//! its life stages (egg → baby → teen → adult), applies the caller's action and rolls for a
//! random event before saving.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chickpet::config::Config;
//! use chickpet::service::PetService;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let service = Arc::new(PetService::from_config(&config));
//!     chickpet::http::serve(&config.server, service).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`pet`] - record types and the time-advance / action / event steps
//! - [`storage`] - file-backed persistence of the single record
//! - [`service`] - the locked load → advance → act → event → save cycle
//! - [`http`] - axum routes over the service
//! - [`agent`] - tool adapter for conversational agents (feature `agent`)
//! - [`config`] - TOML configuration
//! - [`logutil`] - logging setup and helpers
//!
//! ```text
//! ┌─────────────────┐      ┌─────────────────┐
//! │  Tool adapter   │ ───▶ │   HTTP routes   │
//! └─────────────────┘      └─────────────────┘
//!                                   │
//!                          ┌─────────────────┐
//!                          │   PetService    │ ← one lock per request cycle
//!                          └─────────────────┘
//!                             │           │
//!                   ┌───────────────┐ ┌───────────────┐
//!                   │  pet engine   │ │   PetStore    │
//!                   └───────────────┘ └───────────────┘
//! ```

#[cfg(feature = "agent")]
pub mod agent;
pub mod config;
pub mod http;
pub mod logutil;
pub mod pet;
pub mod service;
pub mod storage;
