#![warn(clippy::pedantic)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the hallpass application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod handlers;
pub mod identity;
pub mod models;
pub mod server;
pub mod settings;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use identity::{FirebaseProvider, IdentityGateway, IdentityProvider};
pub use server::{build_cors, configure_services, security_headers};
pub use settings::HallpassSettings;
