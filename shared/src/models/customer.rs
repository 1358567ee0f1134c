//! Customer contact block

use serde::{Deserialize, Serialize};

/// Customer contact details embedded in rentals, reservations and appointments
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl CustomerInfo {
    /// Whether `contact` matches the stored phone or email
    ///
    /// Emails compare trimmed and case-insensitively; phones compare on their
    /// digits (and a leading `+`), so `0917-555-0101` matches `09175550101`.
    /// Request tracking relies on this to check the caller's contact.
    pub fn matches_contact(phone: &str, email: Option<&str>, contact: &str) -> bool {
        let contact = contact.trim();
        if contact.is_empty() {
            return false;
        }
        let normalize_phone = |s: &str| -> String {
            s.chars().filter(|c| c.is_ascii_digit() || *c == '+').collect()
        };
        if phone.trim().eq_ignore_ascii_case(contact) {
            return true;
        }
        let digits = normalize_phone(contact);
        if !digits.is_empty() && normalize_phone(phone) == digits {
            return true;
        }
        email.is_some_and(|e| e.trim().eq_ignore_ascii_case(contact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_matches_phone_ignoring_formatting() {
        assert!(CustomerInfo::matches_contact("+63 917 555 0101", None, "+639175550101"));
        assert!(CustomerInfo::matches_contact("0917-555-0101", None, " 09175550101 "));
        assert!(!CustomerInfo::matches_contact("0917-555-0101", None, "09175550102"));
        assert!(!CustomerInfo::matches_contact("0917", Some("ana@example.com"), "0918"));
    }

    #[test]
    fn contact_matches_email_case_insensitive() {
        assert!(CustomerInfo::matches_contact(
            "0917",
            Some("Maria@Example.com"),
            "  maria@example.COM"
        ));
        assert!(CustomerInfo::matches_contact("0917", Some("ana@example.com "), "Ana@Example.com"));
        assert!(!CustomerInfo::matches_contact("0917", None, "maria@example.com"));
    }

    #[test]
    fn empty_contact_never_matches() {
        assert!(!CustomerInfo::matches_contact("", Some(""), "   "));
    }
}
