//! # Platform Layer
//!
//! Implementations of the [`Connection`](crate::connection::Connection) trait.
//!
//! - [`rest::RestConnection`]: talks to a live org over HTTPS
//!   - queries via `GET /services/data/vXX.X/query?q=…`, following `nextRecordsUrl`
//!   - creates via `POST /services/data/vXX.X/sobjects/{SObject}`
//!   - identity via `GET /services/oauth2/userinfo`
//!
//! - [`memory::InMemoryOrg`]: in-process org for tests
//!   - no network
//!   - enforces the same uniqueness rule the platform applies to assignments

pub mod memory;
pub mod rest;
