//! Identity resolution.
//!
//! The identity provider is an external collaborator: given a raw credential
//! it returns the authenticated [`Principal`] or an error. The default
//! implementation verifies our own HS256 tokens, but the trait keeps the seam
//! open for a hosted provider.

mod identity;

pub use identity::{IdentityProvider, JwtIdentityProvider, Principal, UserMetadata};
