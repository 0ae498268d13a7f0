//! # orgctl Architecture
//!
//! orgctl is a **UI-agnostic library** for two small admin chores on a cloud
//! business org: granting a permission set to a user without caring whether it
//! was already granted, and setting a user's or group's photo from a local file.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (crates/orgctl)                                        │
//! │  - Parses arguments, prompts, renders output                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Sequences resolve → write, names the failing stage       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs) + Query Gateway (query.rs)   │
//! │  - Resolution, idempotent assignment, photo upload          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Connection trait (connection.rs) / platform/               │
//! │  - RestConnection (production), InMemoryOrg (testing)       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Idempotency
//!
//! Assigning a permission set that is already assigned is a success. The write is
//! attempted and the platform's `DUPLICATE_VALUE` rejection is read as "the org
//! is already in the requested state". See [`commands::assign`].
//!
//! ## Ambiguity
//!
//! Names and labels are not unique. When a lookup matches several records the
//! caller-supplied [`query::Chooser`] decides; the default refuses to guess.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business logic for each operation
//! - [`query`]: Record Query Gateway and chooser strategies
//! - [`connection`]: The connection capability trait
//! - [`platform`]: REST and in-memory connections
//! - [`model`]: Record types
//! - [`config`]: Saved org logins and credential resolution
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod connection;
pub mod error;
pub mod model;
pub mod platform;
pub mod query;
