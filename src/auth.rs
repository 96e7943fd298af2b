//! Auth-domain identifiers, credentials, and session models.

pub mod id;
pub mod secret;
pub mod session;

pub use id::*;
pub use secret::*;
pub use session::*;
