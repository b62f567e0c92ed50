//! Testing utilities
//!
//! Mock provider and canned fixtures for isolated unit tests and the
//! integration suite. Compiled only for tests or with the `testing` feature.

pub mod fixtures;
pub mod mock;

pub use fixtures::{registration_body, sign_in_body, validation_body};
pub use mock::MockIdentityProvider;
