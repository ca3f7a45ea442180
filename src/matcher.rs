//! Common Name matching against a required identity

use crate::subject::{oids, SubjectName};

/// Check if any Common Name of the subject equals `required_identity`.
///
/// Comparison is exact and case-sensitive. Wildcards are not expanded and
/// Subject Alternative Names are not consulted. A subject without a Common
/// Name never matches.
///
/// # Examples
/// ```
/// use peer_identity::matcher::matches_common_name;
/// use peer_identity::subject::{oids, RdnAttribute, SubjectName};
///
/// let subject = SubjectName::new(vec![
///     RdnAttribute::new(oids::COMMON_NAME, Some("payments.internal".into())),
/// ]);
/// assert!(matches_common_name(&subject, "payments.internal"));
/// assert!(!matches_common_name(&subject, "billing.internal"));
/// ```
pub fn matches_common_name(subject: &SubjectName, required_identity: &str) -> bool {
    common_names(subject).any(|cn| cn == required_identity)
}

/// Every textual Common Name of the subject, in order
pub fn common_names(subject: &SubjectName) -> impl Iterator<Item = &str> {
    subject.values_of(oids::COMMON_NAME)
}
