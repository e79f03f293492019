//! Request authentication.

mod signature;

pub use signature::{SignatureMode, SignatureVerifier, compute_signature, verify};
