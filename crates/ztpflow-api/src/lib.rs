// ztpflow-api: Async Rust client for the Catalyst Center intent API
// (PnP onboarding, site hierarchy, template programmer, task polling)

pub mod error;
pub mod intent;
pub mod session;
pub mod transport;

pub use error::Error;
pub use session::{ControllerSession, Credentials, RetryPolicy};
pub use transport::{TlsMode, TransportConfig};
