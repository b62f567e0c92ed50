//! Identity Gateway and its provider boundary
//!
//! The gateway owns the three credential operations (register, sign in,
//! validate session) and delegates every one of them to an external identity
//! provider behind the [`IdentityProvider`] trait. It never raises provider
//! faults; each operation folds failure into an error value the HTTP layer
//! can translate into a status code.

pub mod credentials;
pub mod firebase;
pub mod gateway;
pub mod provider;

pub use credentials::{AdminTokenCache, ServiceAccount};
pub use firebase::FirebaseProvider;
pub use gateway::{GatewayError, GatewayErrorKind, IdentityGateway};
pub use provider::{
    codes, DecodedToken, IdTokenResult, IdentityProvider, NewAccount, ProviderError,
    ProviderSession, ProviderUser,
};
