//! Certificate fixtures shared by the integration tests

#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair,
};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::RootCertStore;

const OID_COMMON_NAME: &[u8] = &[0x55, 0x04, 0x03];
const OID_ORGANIZATION: &[u8] = &[0x55, 0x04, 0x0a];
const OID_ORGANIZATIONAL_UNIT: &[u8] = &[0x55, 0x04, 0x0b];
const OID_ECDSA_WITH_SHA256: &[u8] = &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x04, 0x03, 0x02];
const OID_EC_PUBLIC_KEY: &[u8] = &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01];
const OID_PRIME256V1: &[u8] = &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07];

fn encode_len(len: usize) -> Vec<u8> {
    match len {
        0..=0x7f => vec![len as u8],
        0x80..=0xff => vec![0x81, len as u8],
        _ => vec![0x82, (len >> 8) as u8, len as u8],
    }
}

fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    out.extend(encode_len(content.len()));
    out.extend_from_slice(content);
    out
}

fn sequence(parts: &[Vec<u8>]) -> Vec<u8> {
    tlv(0x30, &parts.concat())
}

fn oid(encoded: &[u8]) -> Vec<u8> {
    tlv(0x06, encoded)
}

fn utf8_attribute(attr_oid: &[u8], value: &str) -> Vec<u8> {
    sequence(&[oid(attr_oid), tlv(0x0c, value.as_bytes())])
}

/// commonName attribute with a UTF8String value
pub fn cn(value: &str) -> Vec<u8> {
    utf8_attribute(OID_COMMON_NAME, value)
}

/// commonName attribute with an OCTET STRING value
pub fn binary_cn(value: &[u8]) -> Vec<u8> {
    sequence(&[oid(OID_COMMON_NAME), tlv(0x04, value)])
}

/// commonName attribute with a BMPString (UTF-16BE) value
pub fn bmp_cn(value: &str) -> Vec<u8> {
    let data: Vec<u8> = value.encode_utf16().flat_map(u16::to_be_bytes).collect();
    sequence(&[oid(OID_COMMON_NAME), tlv(0x1e, &data)])
}

/// commonName attribute with a UniversalString (UCS-4BE) value
pub fn universal_cn(value: &str) -> Vec<u8> {
    let data: Vec<u8> = value.chars().flat_map(|c| (c as u32).to_be_bytes()).collect();
    sequence(&[oid(OID_COMMON_NAME), tlv(0x1c, &data)])
}

/// organizationName attribute
pub fn o(value: &str) -> Vec<u8> {
    utf8_attribute(OID_ORGANIZATION, value)
}

/// organizationalUnitName attribute
pub fn ou(value: &str) -> Vec<u8> {
    utf8_attribute(OID_ORGANIZATIONAL_UNIT, value)
}

/// Name built from RDNs, each RDN being a set of attributes
pub fn name(rdns: &[Vec<Vec<u8>>]) -> Vec<u8> {
    let sets: Vec<Vec<u8>> = rdns.iter().map(|rdn| tlv(0x31, &rdn.concat())).collect();
    sequence(&sets)
}

/// Unsigned certificate DER with a hand-shaped subject.
///
/// The signature is filler; only the structure is valid.
pub fn certificate_der(subject_rdns: &[Vec<Vec<u8>>]) -> Vec<u8> {
    let version = tlv(0xa0, &tlv(0x02, &[0x02]));
    let serial = tlv(0x02, &[0x01]);
    let signature_algorithm = sequence(&[oid(OID_ECDSA_WITH_SHA256)]);
    let issuer = name(&[vec![cn("Fixture CA")]]);
    let validity = sequence(&[
        tlv(0x17, b"250101000000Z"),
        tlv(0x17, b"350101000000Z"),
    ]);

    let mut point = vec![0x00, 0x04];
    point.extend_from_slice(&[0x11; 64]);
    let spki = sequence(&[
        sequence(&[oid(OID_EC_PUBLIC_KEY), oid(OID_PRIME256V1)]),
        tlv(0x03, &point),
    ]);

    let tbs = sequence(&[
        version,
        serial,
        signature_algorithm.clone(),
        issuer,
        validity,
        name(subject_rdns),
        spki,
    ]);

    sequence(&[tbs, signature_algorithm, tlv(0x03, &[0x00, 0x30, 0x00])])
}

/// Wrap bytes in a certificate block with 64 column base64 lines
pub fn encode_pem(der: &[u8]) -> String {
    let encoded = STANDARD.encode(der);
    let mut rest = encoded.as_str();
    let mut out = String::from("-----BEGIN CERTIFICATE-----\n");

    while !rest.is_empty() {
        let (line, tail) = rest.split_at(rest.len().min(64));
        out.push_str(line);
        out.push('\n');
        rest = tail;
    }

    out.push_str("-----END CERTIFICATE-----\n");
    out
}

/// PEM text of [`certificate_der`]
pub fn certificate_pem(subject_rdns: &[Vec<Vec<u8>>]) -> String {
    encode_pem(&certificate_der(subject_rdns))
}

/// A test certificate authority issuing leaf certificates
pub struct TestCa {
    pub cert: rcgen::Certificate,
    key: KeyPair,
}

/// A leaf certificate with its private key
pub struct Leaf {
    pub cert: rcgen::Certificate,
    key: KeyPair,
}

impl Leaf {
    pub fn der(&self) -> CertificateDer<'static> {
        self.cert.der().clone()
    }

    pub fn key_pem(&self) -> String {
        self.key.serialize_pem()
    }

    pub fn private_key(&self) -> PrivateKeyDer<'static> {
        PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(self.key.serialize_der()))
    }
}

impl TestCa {
    pub fn new(common_name: &str) -> Self {
        let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.distinguished_name = DistinguishedName::new();
        params
            .distinguished_name
            .push(DnType::CommonName, common_name);

        let key = KeyPair::generate().unwrap();
        let cert = params.self_signed(&key).unwrap();
        TestCa { cert, key }
    }

    pub fn issue(&self, common_name: &str) -> Leaf {
        let mut params = CertificateParams::new(vec!["localhost".to_string()]).unwrap();
        params.distinguished_name = DistinguishedName::new();
        params
            .distinguished_name
            .push(DnType::CommonName, common_name);

        let key = KeyPair::generate().unwrap();
        let cert = params.signed_by(&key, &self.cert, &self.key).unwrap();
        Leaf { cert, key }
    }

    pub fn roots(&self) -> RootCertStore {
        let mut roots = RootCertStore::empty();
        roots.add(self.cert.der().clone()).unwrap();
        roots
    }
}
