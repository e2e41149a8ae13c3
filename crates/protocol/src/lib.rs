//! Wire types for the live response control plane.
//!
//! This crate holds the JSON shapes exchanged with the `/api/v1/cblr` REST
//! surface and the endpoint paths that carry them. It performs no I/O.
//!
//! # Main Types
//!
//! - [`Session`] - Server-side view of a live response session
//! - [`CommandName`] - Fixed vocabulary of commands a sensor understands
//! - [`CommandRequest`] - Payload submitted to a session's command collection
//! - [`StagedFile`] - File held in the server's per-session file space
//! - [`SensorInfo`] - Summary of an endpoint sensor

pub mod command;
pub mod file;
pub mod routes;
pub mod sensor;
pub mod session;

pub use command::{CommandDescriptor, CommandName, CommandRequest, CommandStatusUpdate, DirectoryEntry, ProcessEntry, RegistryValue};
pub use file::StagedFile;
pub use sensor::SensorInfo;
pub use session::{CreateSessionRequest, Session, SessionId, SessionStatus, SessionStatusUpdate};

/// HTTP header carrying the API token on every request.
pub const AUTH_HEADER: &str = "X-Auth-Token";
