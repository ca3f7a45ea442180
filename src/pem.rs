//! Decoding of PEM certificate text received from a peer

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Opening delimiter of a certificate block
pub const BEGIN_CERTIFICATE: &str = "-----BEGIN CERTIFICATE-----";

/// Closing delimiter of a certificate block
pub const END_CERTIFICATE: &str = "-----END CERTIFICATE-----";

/// Decode peer certificate text into DER bytes.
///
/// Every certificate delimiter is stripped and whitespace between the base64
/// lines is ignored. Bare base64 without delimiters is accepted as well.
///
/// # Examples
/// ```
/// use peer_identity::pem::decode_certificate;
///
/// let der = decode_certificate("-----BEGIN CERTIFICATE-----\nAQID\n-----END CERTIFICATE-----\n").unwrap();
/// assert_eq!(der, vec![1, 2, 3]);
/// ```
pub fn decode_certificate(text: &str) -> Result<Vec<u8>> {
    let body: String = text
        .replace(BEGIN_CERTIFICATE, "")
        .replace(END_CERTIFICATE, "")
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if body.is_empty() {
        return Err(Error::decode("Certificate text has no content"));
    }

    STANDARD
        .decode(body.as_bytes())
        .map_err(|e| Error::decode(format!("Invalid base64 content: {}", e)))
}
