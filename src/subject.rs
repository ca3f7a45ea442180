//! Subject name extraction from DER encoded X.509 certificates

use crate::error::{Error, Result};
use std::fmt;
use x509_parser::der_parser::asn1_rs::Tag;
use x509_parser::prelude::*;

/// Dotted identifiers of well-known subject attributes
pub mod oids {
    /// commonName
    pub const COMMON_NAME: &str = "2.5.4.3";
    /// countryName
    pub const COUNTRY: &str = "2.5.4.6";
    /// localityName
    pub const LOCALITY: &str = "2.5.4.7";
    /// stateOrProvinceName
    pub const STATE_OR_PROVINCE: &str = "2.5.4.8";
    /// organizationName
    pub const ORGANIZATION: &str = "2.5.4.10";
    /// organizationalUnitName
    pub const ORGANIZATIONAL_UNIT: &str = "2.5.4.11";
}

/// A single attribute of a relative distinguished name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RdnAttribute {
    /// Attribute type in dotted notation
    oid: String,
    /// Attribute text, `None` when the value is not a string type
    value: Option<String>,
}

impl RdnAttribute {
    /// Create a new attribute
    pub fn new(oid: impl Into<String>, value: Option<String>) -> Self {
        RdnAttribute {
            oid: oid.into(),
            value,
        }
    }

    /// Get the attribute type in dotted notation
    pub fn oid(&self) -> &str {
        &self.oid
    }

    /// Get the attribute text
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Check if this attribute is of the given type
    pub fn is(&self, oid: &str) -> bool {
        self.oid == oid
    }

    fn short_name(&self) -> &str {
        match self.oid.as_str() {
            oids::COMMON_NAME => "CN",
            oids::COUNTRY => "C",
            oids::LOCALITY => "L",
            oids::STATE_OR_PROVINCE => "ST",
            oids::ORGANIZATION => "O",
            oids::ORGANIZATIONAL_UNIT => "OU",
            other => other,
        }
    }
}

impl fmt::Display for RdnAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.short_name(), value),
            None => write!(f, "{}=<binary>", self.short_name()),
        }
    }
}

/// Ordered subject attributes of a certificate.
///
/// Multi-valued RDNs are flattened in encounter order. Attribute types may
/// repeat, so lookups return every occurrence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubjectName {
    attributes: Vec<RdnAttribute>,
}

impl SubjectName {
    /// Create a subject from an attribute sequence
    pub fn new(attributes: Vec<RdnAttribute>) -> Self {
        SubjectName { attributes }
    }

    fn from_x509_name(name: &X509Name<'_>) -> Self {
        let attributes = name
            .iter()
            .flat_map(|rdn| rdn.iter())
            .map(|atv| {
                RdnAttribute::new(
                    atv.attr_type().to_id_string(),
                    attribute_text(atv),
                )
            })
            .collect();

        SubjectName { attributes }
    }

    /// Iterate over the attributes in order
    pub fn iter(&self) -> impl Iterator<Item = &RdnAttribute> {
        self.attributes.iter()
    }

    /// Get the attributes as a slice
    pub fn attributes(&self) -> &[RdnAttribute] {
        &self.attributes
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Check if the subject has no attributes
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Text values of every attribute of the given type, in order
    pub fn values_of<'a>(&'a self, oid: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.attributes
            .iter()
            .filter(move |attr| attr.is(oid))
            .filter_map(RdnAttribute::value)
    }
}

impl fmt::Display for SubjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, attr) in self.attributes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", attr)?;
        }
        Ok(())
    }
}

/// Text of a string-typed attribute value.
///
/// BMPString (UTF-16BE) and UniversalString (UCS-4BE) are decoded here; the
/// byte-oriented string types go through x509-parser.
fn attribute_text(atv: &AttributeTypeAndValue<'_>) -> Option<String> {
    let value = atv.attr_value();
    match value.header.tag() {
        Tag::BmpString => decode_bmp_string(value.data),
        Tag::UniversalString => decode_universal_string(value.data),
        _ => atv.as_str().ok().map(str::to_owned),
    }
}

fn decode_bmp_string(data: &[u8]) -> Option<String> {
    if data.len() % 2 != 0 {
        return None;
    }
    let units = data
        .chunks_exact(2)
        .map(|unit| u16::from_be_bytes([unit[0], unit[1]]));
    char::decode_utf16(units).collect::<std::result::Result<String, _>>().ok()
}

fn decode_universal_string(data: &[u8]) -> Option<String> {
    if data.len() % 4 != 0 {
        return None;
    }
    data.chunks_exact(4)
        .map(|c| char::from_u32(u32::from_be_bytes([c[0], c[1], c[2], c[3]])))
        .collect()
}

/// Parse a DER certificate and extract its subject attributes
pub fn extract_subject(der: &[u8]) -> Result<SubjectName> {
    let (rest, cert) = X509Certificate::from_der(der)
        .map_err(|e| Error::parse(format!("Failed to parse certificate: {}", e)))?;

    if !rest.is_empty() {
        return Err(Error::parse(format!(
            "{} trailing bytes after certificate",
            rest.len()
        )));
    }

    Ok(SubjectName::from_x509_name(cert.subject()))
}
