//! Storage layer: accounts, federated sessions, and bin status overrides.

pub mod accounts;
pub mod sessions;
pub mod status;

pub use accounts::AccountStore;
pub use sessions::SessionStore;
pub use status::StatusStore;
