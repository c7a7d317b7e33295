//! Index provisioning: schema declaration and create-or-replace

pub mod provision;
pub mod schema;

pub use provision::{provision, ProvisionOutcome};
pub use schema::{fields, IndexSchema};
