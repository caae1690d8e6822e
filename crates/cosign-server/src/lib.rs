//! # Cosign Server
//!
//! JSON-over-HTTP front end for the [`cosign::Cosigner`].
//!
//! | Route | Body | Data |
//! |---|---|---|
//! | `POST /document/create` | `{email, doc_title?, template_id?}` | record |
//! | `POST /document/perm` | `{email, doc_id}` | record |
//! | `POST /document/sign` | `{email, doc_id}` | record |
//! | `POST /document/list` | `{email}` | `[record]` |
//! | `GET /healthz` | | `ok` |
//!
//! Responses are wrapped as `{success, error, data}`. Malformed input maps
//! to 400, unknown documents or parties to 404, external store failures to
//! 502 (504 on timeout) and record store failures to 500.

pub mod api;
pub mod config;
pub mod error;

pub use api::router;
pub use config::ServerConfig;
pub use error::{ApiError, Envelope};
