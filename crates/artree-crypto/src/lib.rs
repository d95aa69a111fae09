//! Canonical content hashing for artree.
//!
//! Identities follow the git blob scheme: the digest of `blob <len>\0`
//! followed by the content. SHA-1 and SHA-256 are supported, alone or
//! together in a single read pass.
//!
//! All hashing wraps the RustCrypto digest implementations; there is no
//! custom cryptography here.

pub mod hasher;

pub use hasher::{header, HashEngine, HashError};
