//! rustls certificate verifiers enforcing a Common Name identity
//!
//! Chain validation is delegated to rustls' webpki verification. The DNS
//! server name presented by the client is not consulted: the peer identity
//! is established by the certificate's Common Name instead.

use crate::config::{TlsSettings, VerifierConfig};
use crate::error::{Error, Result};
use crate::verifier::PeerVerifier;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::verify_server_cert_signed_by_trust_anchor;
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::server::danger::{ClientCertVerified, ClientCertVerifier};
use rustls::server::{ParsedCertificate, WebPkiClientVerifier};
use rustls::{
    CertificateError, ClientConfig, DigitallySignedStruct, DistinguishedName, Error as TlsError,
    RootCertStore, ServerConfig, SignatureScheme,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

fn default_provider() -> Arc<CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

fn check_identity(
    verifier: &PeerVerifier,
    end_entity: &CertificateDer<'_>,
) -> std::result::Result<(), TlsError> {
    if verifier.verify_der(end_entity.as_ref()) {
        debug!("Peer identity {} verified", verifier.required_identity());
        Ok(())
    } else {
        warn!(
            "Peer certificate does not assert identity {}",
            verifier.required_identity()
        );
        Err(TlsError::InvalidCertificate(CertificateError::NotValidForName))
    }
}

/// Server certificate verifier for outbound connections
#[derive(Debug)]
pub struct CommonNameServerVerifier {
    roots: Arc<RootCertStore>,
    provider: Arc<CryptoProvider>,
    verifier: PeerVerifier,
}

impl CommonNameServerVerifier {
    /// Create a verifier trusting `roots` and requiring the bound identity
    pub fn new(roots: impl Into<Arc<RootCertStore>>, verifier: PeerVerifier) -> Result<Arc<Self>> {
        let roots = roots.into();
        if roots.is_empty() {
            return Err(Error::tls("Root certificate store is empty"));
        }

        info!(
            "Creating server verifier for identity {} with {} roots",
            verifier.required_identity(),
            roots.len()
        );

        Ok(Arc::new(CommonNameServerVerifier {
            roots,
            provider: default_provider(),
            verifier,
        }))
    }

    /// Create a verifier from configuration
    pub fn from_config(config: &VerifierConfig) -> Result<Arc<Self>> {
        Self::new(config.load_trust_anchors()?, config.verifier()?)
    }
}

impl ServerCertVerifier for CommonNameServerVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, TlsError> {
        let cert = ParsedCertificate::try_from(end_entity)?;

        verify_server_cert_signed_by_trust_anchor(
            &cert,
            &self.roots,
            intermediates,
            now,
            self.provider.signature_verification_algorithms.all,
        )?;

        check_identity(&self.verifier, end_entity)?;

        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, TlsError> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, TlsError> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// Client certificate verifier for inbound mTLS connections
#[derive(Debug)]
pub struct CommonNameClientVerifier {
    inner: Arc<dyn ClientCertVerifier>,
    verifier: PeerVerifier,
}

impl CommonNameClientVerifier {
    /// Create a verifier trusting `roots` and requiring the bound identity
    pub fn new(roots: impl Into<Arc<RootCertStore>>, verifier: PeerVerifier) -> Result<Arc<Self>> {
        let inner = WebPkiClientVerifier::builder_with_provider(roots.into(), default_provider())
            .build()
            .map_err(|e| Error::tls(format!("Failed to create client verifier: {}", e)))?;

        info!(
            "Creating client verifier for identity {}",
            verifier.required_identity()
        );

        Ok(Arc::new(CommonNameClientVerifier { inner, verifier }))
    }

    /// Create a verifier from configuration
    pub fn from_config(config: &VerifierConfig) -> Result<Arc<Self>> {
        Self::new(config.load_trust_anchors()?, config.verifier()?)
    }
}

impl ClientCertVerifier for CommonNameClientVerifier {
    fn root_hint_subjects(&self) -> &[DistinguishedName] {
        self.inner.root_hint_subjects()
    }

    fn verify_client_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        now: UnixTime,
    ) -> std::result::Result<ClientCertVerified, TlsError> {
        self.inner.verify_client_cert(end_entity, intermediates, now)?;

        check_identity(&self.verifier, end_entity)?;

        Ok(ClientCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, TlsError> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, TlsError> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}

/// Client and server configuration for talking to one allowed peer
#[derive(Clone, Debug)]
pub struct PeerTlsConfig {
    /// Configuration for connecting to the peer
    pub client: Arc<ClientConfig>,
    /// Configuration for accepting connections from the peer
    pub server: Arc<ServerConfig>,
}

impl TlsSettings {
    /// Build one mutual TLS configuration per allowed peer, keyed by identity
    pub fn generate_tls_configs(&self) -> Result<HashMap<String, PeerTlsConfig>> {
        if !self.enable {
            return Err(Error::config(
                "Cannot generate TLS configuration while TLS is disabled",
            ));
        }
        self.validate()?;

        let roots = Arc::new(self.load_roots()?);
        let chain = self.load_chain()?;
        let key = self.load_key()?;
        let provider = default_provider();

        let mut configs = HashMap::with_capacity(self.allowed_peers.len());
        for peer in &self.allowed_peers {
            let verifier = PeerVerifier::new(peer);

            let client = ClientConfig::builder_with_provider(provider.clone())
                .with_safe_default_protocol_versions()
                .map_err(|e| Error::tls(format!("Unsupported protocol versions: {}", e)))?
                .dangerous()
                .with_custom_certificate_verifier(CommonNameServerVerifier::new(
                    roots.clone(),
                    verifier.clone(),
                )?)
                .with_client_auth_cert(chain.clone(), key.clone_key())
                .map_err(|e| Error::tls(format!("Failed to create client config: {}", e)))?;

            let server = ServerConfig::builder_with_provider(provider.clone())
                .with_safe_default_protocol_versions()
                .map_err(|e| Error::tls(format!("Unsupported protocol versions: {}", e)))?
                .with_client_cert_verifier(CommonNameClientVerifier::new(roots.clone(), verifier)?)
                .with_single_cert(chain.clone(), key.clone_key())
                .map_err(|e| Error::tls(format!("Failed to create server config: {}", e)))?;

            configs.insert(
                peer.clone(),
                PeerTlsConfig {
                    client: Arc::new(client),
                    server: Arc::new(server),
                },
            );
        }

        info!("Generated TLS configurations for {} peers", configs.len());
        Ok(configs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_verifier_requires_roots() {
        let result =
            CommonNameServerVerifier::new(RootCertStore::empty(), PeerVerifier::new("svc"));
        assert!(matches!(result, Err(Error::Tls(_))));
    }

    #[test]
    fn test_client_verifier_requires_roots() {
        let result =
            CommonNameClientVerifier::new(RootCertStore::empty(), PeerVerifier::new("svc"));
        assert!(matches!(result, Err(Error::Tls(_))));
    }
}
