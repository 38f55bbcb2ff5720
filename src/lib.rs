pub mod config;
pub mod dnssec;
pub mod error;
pub mod identifier;
pub mod metrics;
pub mod model;
pub mod rrset;
pub mod transport;
pub mod zone;

pub use config::{RoleConfig, SyncConfig};
pub use error::{ConfigError, Result, SyncError};
pub use model::{DnssecKey, Domain, Rrset};
pub use transport::{PdnsClient, ServerRole, UpstreamResponse};
