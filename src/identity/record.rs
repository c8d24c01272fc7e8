//! Identity form data, field validation and normalization.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity details as entered by the user.
///
/// Exists only for the duration of a verification action; nothing here is
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRecord {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    #[serde(default)]
    pub document_type: String,
    pub document_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

/// A field that failed validation, with the message shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Minimum lengths, in characters, of the trimmed required fields.
const MIN_FULL_NAME: usize = 2;
const MIN_PHONE_NUMBER: usize = 10;
const MIN_ADDRESS: usize = 10;
const MIN_DOCUMENT_TYPE: usize = 1;
const MIN_DOCUMENT_NUMBER: usize = 5;

impl IdentityRecord {
    /// Check every field and report all failures at once.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        check_min(&mut errors, "fullName", &self.full_name, MIN_FULL_NAME,
            "Full name must be at least 2 characters");
        if !is_plausible_email(trim(&self.email)) {
            errors.push(FieldError::new("email", "Please enter a valid email address"));
        }
        check_min(&mut errors, "phoneNumber", &self.phone_number, MIN_PHONE_NUMBER,
            "Phone number must be at least 10 digits");
        check_min(&mut errors, "address", &self.address, MIN_ADDRESS,
            "Address must be at least 10 characters");
        check_min(&mut errors, "documentType", &self.document_type, MIN_DOCUMENT_TYPE,
            "Please select a document type");
        check_min(&mut errors, "documentNumber", &self.document_number, MIN_DOCUMENT_NUMBER,
            "Document number must be at least 5 characters");

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Trim every field, lower-case the email and default the optional field.
    pub fn normalize(&self) -> NormalizedIdentity {
        NormalizedIdentity {
            full_name: trim(&self.full_name).to_string(),
            email: trim(&self.email).to_lowercase(),
            phone_number: trim(&self.phone_number).to_string(),
            address: trim(&self.address).to_string(),
            document_type: trim(&self.document_type).to_string(),
            document_number: trim(&self.document_number).to_string(),
            additional_info: self
                .additional_info
                .as_deref()
                .map(trim)
                .unwrap_or_default()
                .to_string(),
        }
    }
}

fn check_min(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: &str,
    min: usize,
    message: &'static str,
) {
    if trim(value).chars().count() < min {
        errors.push(FieldError::new(field, message));
    }
}

/// Whitespace as web clients trim it: ECMAScript WhiteSpace plus
/// LineTerminator. Differs from `char::is_whitespace` on U+FEFF (trimmed
/// here) and U+0085 (kept here). Digests depend on this set.
fn is_trimmable(c: char) -> bool {
    matches!(
        c,
        '\u{0009}' | '\u{000A}' | '\u{000B}' | '\u{000C}' | '\u{000D}' | '\u{0020}'
            | '\u{00A0}' | '\u{1680}' | '\u{2000}'..='\u{200A}' | '\u{2028}' | '\u{2029}'
            | '\u{202F}' | '\u{205F}' | '\u{3000}' | '\u{FEFF}'
    )
}

fn trim(value: &str) -> &str {
    value.trim_matches(is_trimmable)
}

/// `local@domain.tld` in the shape web form validators accept: the local part
/// has no leading or doubled dots and does not end in one, domain labels start
/// alphanumeric, and the TLD is at least two letters.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if email.starts_with('.') || email.contains("..") {
        return false;
    }

    let local_ok = local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '\'' | '+' | '-' | '.'))
        && local
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-'));
    if !local_ok {
        return false;
    }

    let Some((hosts, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    let hosts_ok = hosts.split('.').all(|label| {
        label.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    hosts_ok && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// A record after normalization, ready to be serialized for hashing.
///
/// Field declaration order is the canonical key order of the hash input and
/// must not change: digests already recorded on-chain depend on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedIdentity {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub document_type: String,
    pub document_number: String,
    pub additional_info: String,
}

impl NormalizedIdentity {
    /// Compact JSON with the fixed key order.
    pub fn canonical_json(&self) -> String {
        // Serializing a struct of plain strings cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<NormalizedIdentity> for IdentityRecord {
    fn from(n: NormalizedIdentity) -> Self {
        Self {
            full_name: n.full_name,
            email: n.email,
            phone_number: n.phone_number,
            address: n.address,
            document_type: n.document_type,
            document_number: n.document_number,
            additional_info: Some(n.additional_info),
        }
    }
}
