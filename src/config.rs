//! Verifier configuration

use crate::error::{Error, Result};
use crate::verifier::PeerVerifier;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::RootCertStore;
use serde::Deserialize;
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Configuration of a peer verifier
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifierConfig {
    /// Identity the peer certificate must carry as a Common Name
    pub required_identity: String,
    /// PEM files with CA certificates trusted by the TLS verifiers
    #[serde(default)]
    pub trust_anchors: Vec<PathBuf>,
}

impl VerifierConfig {
    /// Create a configuration without trust anchors
    pub fn new(required_identity: impl Into<String>) -> Self {
        VerifierConfig {
            required_identity: required_identity.into(),
            trust_anchors: Vec::new(),
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: VerifierConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        debug!("Loaded verifier configuration from {}", path.display());
        Self::from_json_str(&json)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.required_identity.is_empty() {
            return Err(Error::config("Required identity cannot be empty"));
        }

        if self.required_identity.trim() != self.required_identity {
            return Err(Error::config(
                "Required identity cannot have leading or trailing whitespace",
            ));
        }

        Ok(())
    }

    /// Build the peer verifier for this configuration
    pub fn verifier(&self) -> Result<PeerVerifier> {
        self.validate()?;
        Ok(PeerVerifier::new(&self.required_identity))
    }

    /// Load every certificate of every trust anchor file into a root store
    pub fn load_trust_anchors(&self) -> Result<RootCertStore> {
        if self.trust_anchors.is_empty() {
            return Err(Error::config("No trust anchors configured"));
        }

        load_root_store(&self.trust_anchors)
    }
}

/// Mutual TLS settings of a node talking to a fixed set of peers
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TlsSettings {
    /// Whether TLS is enabled at all
    #[serde(default)]
    pub enable: bool,
    /// PEM file with the CA certificates trusted for peers
    pub root_location: PathBuf,
    /// PEM file with this node's certificate chain, leaf first
    pub chain_location: PathBuf,
    /// PEM file with this node's private key
    pub key_location: PathBuf,
    /// Identities (Common Names) of the peers this node may talk to
    #[serde(default)]
    pub allowed_peers: Vec<String>,
}

impl TlsSettings {
    /// Parse and validate JSON settings
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: TlsSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read and validate a JSON settings file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        for peer in &self.allowed_peers {
            VerifierConfig::new(peer.as_str()).validate()?;
        }
        Ok(())
    }

    /// Trusted roots from `root_location`
    pub fn load_roots(&self) -> Result<RootCertStore> {
        load_root_store(std::slice::from_ref(&self.root_location))
    }

    /// This node's certificate chain from `chain_location`
    pub fn load_chain(&self) -> Result<Vec<CertificateDer<'static>>> {
        let mut reader = BufReader::new(fs::File::open(&self.chain_location)?);
        let chain = rustls_pemfile::certs(&mut reader).collect::<std::io::Result<Vec<_>>>()?;

        if chain.is_empty() {
            return Err(Error::config(format!(
                "No certificates found in {}",
                self.chain_location.display()
            )));
        }

        Ok(chain)
    }

    /// This node's private key from `key_location`
    pub fn load_key(&self) -> Result<PrivateKeyDer<'static>> {
        let mut reader = BufReader::new(fs::File::open(&self.key_location)?);
        rustls_pemfile::private_key(&mut reader)?.ok_or_else(|| {
            Error::config(format!(
                "No private key found in {}",
                self.key_location.display()
            ))
        })
    }
}

fn load_root_store(paths: &[PathBuf]) -> Result<RootCertStore> {
    let mut roots = RootCertStore::empty();

    for path in paths {
        let mut reader = BufReader::new(fs::File::open(path)?);
        let mut added = 0usize;

        for cert in rustls_pemfile::certs(&mut reader) {
            roots.add(cert?).map_err(|e| {
                Error::tls(format!(
                    "Failed to add trust anchor from {}: {}",
                    path.display(),
                    e
                ))
            })?;
            added += 1;
        }

        if added == 0 {
            return Err(Error::config(format!(
                "No certificates found in {}",
                path.display()
            )));
        }

        debug!("Added {} trust anchors from {}", added, path.display());
    }

    info!("Loaded {} trust anchors", roots.len());
    Ok(roots)
}
