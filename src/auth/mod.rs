pub mod credentials;
pub mod token;

pub use credentials::{CredentialPolicy, PresenceOnly, RegisterOnFirstLogin};
pub use token::TokenIssuer;
