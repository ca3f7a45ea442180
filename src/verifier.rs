//! Peer verification bound to a required identity

use crate::error::Result;
use crate::matcher::{common_names, matches_common_name};
use crate::pem::decode_certificate;
use crate::subject::extract_subject;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Verifies that a peer certificate asserts a fixed identity.
///
/// The identity is bound once and shared read-only between clones, so a
/// single verifier can serve any number of concurrent handshakes.
#[derive(Clone, PartialEq, Eq)]
pub struct PeerVerifier {
    required_identity: Arc<str>,
}

impl PeerVerifier {
    /// Bind a required identity
    ///
    /// # Examples
    /// ```
    /// use peer_identity::PeerVerifier;
    ///
    /// let verifier = PeerVerifier::new("payments.internal");
    /// assert_eq!(verifier.required_identity(), "payments.internal");
    /// assert!(!verifier.verify("not a certificate"));
    /// ```
    pub fn new(required_identity: impl AsRef<str>) -> Self {
        PeerVerifier {
            required_identity: Arc::from(required_identity.as_ref()),
        }
    }

    /// Get the bound identity
    pub fn required_identity(&self) -> &str {
        &self.required_identity
    }

    /// Verify PEM certificate text. Malformed input is rejected.
    pub fn verify(&self, peer_pem: &str) -> bool {
        self.fold(self.evaluate(peer_pem))
    }

    /// Verify a DER certificate. Malformed input is rejected.
    pub fn verify_der(&self, der: &[u8]) -> bool {
        self.fold(self.evaluate_der(der))
    }

    /// Verify PEM certificate text, surfacing decode and parse failures
    pub fn evaluate(&self, peer_pem: &str) -> Result<bool> {
        let der = decode_certificate(peer_pem)?;
        self.evaluate_der(&der)
    }

    /// Verify a DER certificate, surfacing parse failures
    pub fn evaluate_der(&self, der: &[u8]) -> Result<bool> {
        let subject = extract_subject(der)?;
        let matched = matches_common_name(&subject, &self.required_identity);

        if !matched {
            debug!(
                required = %self.required_identity,
                common_names = ?common_names(&subject).collect::<Vec<_>>(),
                "Peer certificate Common Name does not match"
            );
        }

        Ok(matched)
    }

    /// Turn the verifier into a plain callback for hosts that expect a closure
    pub fn into_callback(self) -> impl Fn(&str) -> bool + Send + Sync + Clone + 'static {
        move |peer_pem: &str| self.verify(peer_pem)
    }

    fn fold(&self, outcome: Result<bool>) -> bool {
        match outcome {
            Ok(matched) => matched,
            Err(e) if e.is_malformed_certificate() => {
                warn!(
                    required = %self.required_identity,
                    error = %e,
                    "Rejecting malformed peer certificate"
                );
                false
            }
            Err(e) => {
                error!(
                    required = %self.required_identity,
                    error = %e,
                    "Peer verification failed"
                );
                false
            }
        }
    }
}

impl fmt::Debug for PeerVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerVerifier")
            .field("required_identity", &&*self.required_identity)
            .finish()
    }
}
