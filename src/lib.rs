//! Peer identity verification for mTLS RPC channels
//!
//! Decides whether a peer certificate presented during a TLS handshake
//! asserts a required identity through its subject Common Name.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod matcher;
pub mod pem;
pub mod subject;
pub mod tls;
pub mod verifier;

pub use config::{TlsSettings, VerifierConfig};
pub use error::{Error, Result};
pub use subject::{RdnAttribute, SubjectName};
pub use tls::{CommonNameClientVerifier, CommonNameServerVerifier, PeerTlsConfig};
pub use verifier::PeerVerifier;
