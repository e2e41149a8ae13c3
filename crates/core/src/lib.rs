//! cblr: a client engine for endpoint live response sessions.
//!
//! [`LiveResponse`] attaches to a session on the control plane, keeps it alive
//! in the background and runs sensor commands against it with a pseudo
//! working directory resolved locally.
//!
//! # Example
//!
//! ```ignore
//! use cblr::{AttachOptions, CancellationToken, LiveResponse, TransportConfig};
//!
//! #[tokio::main]
//! async fn main() -> cblr::Result<()> {
//!     let config = TransportConfig::new("https://cb.example:8443", "api-token");
//!     let mut lr = LiveResponse::connect(config).await?;
//!
//!     lr.attach(42, AttachOptions::waiting()).await?;
//!     let cancel = CancellationToken::new();
//!     let listing = lr.list_directory(Some("Windows\\Temp\\"), &cancel).await?;
//!     for entry in listing.entries {
//!         println!("{}", entry.filename);
//!     }
//!
//!     lr.detach().await?;
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod dispatch;
pub mod error;
pub mod keepalive;
pub mod path;
pub mod registry;
pub mod result;
pub mod sensor;
pub mod session;
pub mod transport;

pub use cblr_protocol as protocol;
pub use dispatch::{CommandDispatcher, PathStat};
pub use error::{Error, Result};
pub use keepalive::{IdleCounter, KeepAliveConfig, KeepAliveSupervisor};
pub use registry::SessionRegistry;
pub use result::CommandResult;
pub use sensor::{SensorDirectory, SensorQuery};
pub use session::{
	AttachOptions, AttachedSession, DEFAULT_ATTACH_TIMEOUT, DirectoryListing, ExecOutcome, ExecRequest, FileRange, LiveResponse,
	RegistryKeyListing, RegistryValueSpec, RetrievedFile,
};
pub use tokio_util::sync::CancellationToken;
pub use transport::{DEFAULT_REQUEST_TIMEOUT, Transport, TransportConfig};
