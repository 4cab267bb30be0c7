//! Entity types for secret-store, shared between the service layer and the
//! CLI front-end.

pub mod guardian;
pub mod identity;
pub mod store;

pub use guardian::Guardian;
pub use identity::{PrivateIdentity, PublicIdentity};
pub use store::{EncryptedStore, Store};
