//! Foundation types for artree.
//!
//! This crate provides the identity and configuration types shared by every
//! other artree crate. It never hashes content itself; see `artree-crypto`.
//!
//! # Key Types
//!
//! - [`HashAlgorithm`] -- a single digest algorithm (SHA-1 or SHA-256)
//! - [`DigestConfig`] -- the closed set of algorithm combinations a tree may use
//! - [`Identifier`] -- a validated, content-free identity string

pub mod digest;
pub mod error;
pub mod identifier;

pub use digest::{DigestConfig, HashAlgorithm};
pub use error::TypeError;
pub use identifier::Identifier;
