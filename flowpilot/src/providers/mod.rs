//! Identity providers available for third-party sign-in

mod config;
mod directory;
mod errors;

pub use config::{IdentityProviderConfig, ProviderSettings};
pub use directory::{IdentityProvider, ProviderDirectory, ProviderSource};
pub use errors::ProviderError;
