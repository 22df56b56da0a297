use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

use super::dto::{CustomerDetails, Field};

/// Loose local phone shape: optional leading `+`, 9 to 15 digits, common separators allowed.
pub(crate) fn is_valid_phone(phone: &str) -> bool {
    lazy_static! {
        static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9(][0-9\s\-()]{7,18}[0-9]$").unwrap();
    }
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    PHONE_RE.is_match(phone) && (9..=15).contains(&digits)
}

/// Field-level messages for the checkout form; empty means valid.
pub fn validate_customer(details: &CustomerDetails) -> BTreeMap<Field, String> {
    let d = details.trimmed();
    let mut errors = BTreeMap::new();
    if d.name.is_empty() {
        errors.insert(Field::Name, "Name is required".to_string());
    }
    if d.phone.is_empty() {
        errors.insert(Field::Phone, "Phone number is required".to_string());
    } else if !is_valid_phone(&d.phone) {
        errors.insert(Field::Phone, "Enter a valid phone number".to_string());
    }
    if d.address.is_empty() {
        errors.insert(Field::Address, "Delivery address is required".to_string());
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_shapes() {
        assert!(is_valid_phone("0911234567"));
        assert!(is_valid_phone("+251 91 123 4567"));
        assert!(is_valid_phone("(011) 555-1234"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("call me maybe"));
        assert!(!is_valid_phone("+2519112345678901234"));
    }

    #[test]
    fn blank_fields_are_reported_per_field() {
        let errors = validate_customer(&CustomerDetails {
            name: "   ".into(),
            phone: "abc".into(),
            address: String::new(),
            notes: None,
        });
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[&Field::Name], "Name is required");
        assert_eq!(errors[&Field::Phone], "Enter a valid phone number");
        assert!(errors.contains_key(&Field::Address));
    }

    #[test]
    fn complete_details_pass() {
        let errors = validate_customer(&CustomerDetails {
            name: "Abebe".into(),
            phone: "0911234567".into(),
            address: "Bole, Addis Ababa".into(),
            notes: Some("ring twice".into()),
        });
        assert!(errors.is_empty());
    }
}
