//! Payment-instrument field validation.
//!
//! Every check here is total: it returns a `bool` or a [`CardBrand`] and never
//! fails, so a form can re-run it on every keystroke.

mod format;

pub use format::{format_card_number, mask_card_number, MAX_CARD_DIGITS};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shortest card number accepted by the checksum.
pub const MIN_CARD_DIGITS: usize = 13;

/// Card network derived from the leading digits (IIN).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Unknown,
}

impl CardBrand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::Amex => "amex",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip every non-digit character.
pub fn normalize_digits(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Detect the card brand from its leading digits.
pub fn detect_brand(input: &str) -> CardBrand {
    let digits = normalize_digits(input);

    if digits.starts_with('4') {
        return CardBrand::Visa;
    }
    if is_mastercard_iin(&digits) {
        return CardBrand::Mastercard;
    }
    if digits.starts_with("34") || digits.starts_with("37") {
        return CardBrand::Amex;
    }
    CardBrand::Unknown
}

fn is_mastercard_iin(digits: &str) -> bool {
    let prefix = |len: usize| digits.get(..len).and_then(|p| p.parse::<u32>().ok());

    if matches!(prefix(2), Some(51..=55)) {
        return true;
    }
    matches!(prefix(4), Some(2221..=2720))
}

/// Luhn checksum over the digits of `input`.
///
/// Fewer than [`MIN_CARD_DIGITS`] digits never pass.
pub fn luhn_check(input: &str) -> bool {
    let digits = normalize_digits(input);
    if digits.len() < MIN_CARD_DIGITS {
        return false;
    }

    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let n = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = n * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                n
            }
        })
        .sum();

    sum % 10 == 0
}

/// Whether `year_month` (`YYYY-MM`) is not before `reference` (`YYYY-MM`).
///
/// Zero-padded ISO year-months compare chronologically as strings. A value
/// that is not shaped `YYYY-MM` is never valid.
pub fn expiry_valid(year_month: &str, reference: &str) -> bool {
    is_year_month(year_month) && year_month >= reference
}

fn is_year_month(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 7 || bytes[4] != b'-' {
        return false;
    }
    if !bytes[..4].iter().chain(&bytes[5..]).all(u8::is_ascii_digit) {
        return false;
    }
    matches!(value[5..].parse::<u8>(), Ok(1..=12))
}

/// Exactly three or four ASCII digits.
pub fn cvv_valid(cvv: &str) -> bool {
    (3..=4).contains(&cvv.len()) && cvv.bytes().all(|b| b.is_ascii_digit())
}

/// Current month as `YYYY-MM` (UTC).
pub fn current_year_month() -> String {
    chrono::Utc::now().format("%Y-%m").to_string()
}

/// All payment fields valid at once.
pub fn can_submit(amount: f64, card_number: &str, expiry: &str, reference: &str, cvv: &str) -> bool {
    amount > 0.0 && luhn_check(card_number) && expiry_valid(expiry, reference) && cvv_valid(cvv)
}

/// Admin-side card record being created or edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardDraft {
    pub card_number: String,
    pub expiration: String,
    pub cvv: String,
    pub balance: String,
    pub active: bool,
}

impl CardDraft {
    /// Names of the fields that block saving.
    pub fn invalid_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if normalize_digits(&self.card_number).len() < MIN_CARD_DIGITS {
            fields.push("card_number");
        }
        if self.expiration.trim().is_empty() {
            fields.push("expiration");
        }
        if !cvv_valid(&self.cvv) {
            fields.push("cvv");
        }
        if self.parsed_balance().is_none() {
            fields.push("balance");
        }
        fields
    }

    pub fn can_save(&self) -> bool {
        self.invalid_fields().is_empty()
    }

    pub fn digits(&self) -> String {
        normalize_digits(&self.card_number)
    }

    pub fn parsed_balance(&self) -> Option<f64> {
        self.balance
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|b| b.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_digits() {
        assert_eq!(normalize_digits("4111 1111-1111 1111"), "4111111111111111");
        assert_eq!(normalize_digits(""), "");
        assert_eq!(normalize_digits("abc"), "");
    }

    #[test]
    fn test_detect_brand_vectors() {
        assert_eq!(detect_brand("4111111111111111"), CardBrand::Visa);
        assert_eq!(detect_brand("5500000000000004"), CardBrand::Mastercard);
        assert_eq!(detect_brand("340000000000009"), CardBrand::Amex);
        assert_eq!(detect_brand("9999999999999999"), CardBrand::Unknown);
    }

    #[test]
    fn test_detect_brand_mastercard_2_series_bounds() {
        assert_eq!(detect_brand("2220990000000000"), CardBrand::Unknown);
        assert_eq!(detect_brand("2221000000000009"), CardBrand::Mastercard);
        assert_eq!(detect_brand("2720990000000000"), CardBrand::Mastercard);
        assert_eq!(detect_brand("2721000000000000"), CardBrand::Unknown);
        assert_eq!(detect_brand("50"), CardBrand::Unknown);
        assert_eq!(detect_brand("56"), CardBrand::Unknown);
        assert_eq!(detect_brand("222"), CardBrand::Unknown);
        assert_eq!(detect_brand(""), CardBrand::Unknown);
    }

    #[test]
    fn test_detect_brand_ignores_separators() {
        assert_eq!(detect_brand("3782 822463 10005"), CardBrand::Amex);
    }

    #[test]
    fn test_luhn_known_numbers() {
        assert!(luhn_check("4111111111111111"));
        assert!(luhn_check("5500000000000004"));
        assert!(luhn_check("340000000000009"));
        assert!(luhn_check("378282246310005"));
        assert!(luhn_check("4111 1111 1111 1111"));
        assert!(!luhn_check("4111111111111112"));
        assert!(!luhn_check("9999999999999999"));
    }

    #[test]
    fn test_luhn_rejects_short_input() {
        // 12 digits with a valid checksum
        assert!(!luhn_check("000000000000"));
        assert!(luhn_check("0000000000000"));
        assert!(!luhn_check(""));
    }

    #[test]
    fn test_expiry_valid() {
        assert!(expiry_valid("2030-01", "2025-06"));
        assert!(expiry_valid("2025-06", "2025-06"));
        assert!(!expiry_valid("2020-01", "2025-06"));
        assert!(!expiry_valid("2025-05", "2025-06"));
    }

    #[test]
    fn test_expiry_rejects_malformed() {
        assert!(!expiry_valid("", "2025-06"));
        assert!(!expiry_valid("2030", "2025-06"));
        assert!(!expiry_valid("2030-13", "2025-06"));
        assert!(!expiry_valid("2030-00", "2025-06"));
        assert!(!expiry_valid("2030/01", "2025-06"));
        assert!(!expiry_valid("203a-01", "2025-06"));
    }

    #[test]
    fn test_cvv_valid() {
        assert!(cvv_valid("123"));
        assert!(cvv_valid("1234"));
        assert!(!cvv_valid("12"));
        assert!(!cvv_valid("12345"));
        assert!(!cvv_valid("12a"));
        assert!(!cvv_valid("１２３"));
    }

    #[test]
    fn test_can_submit_requires_every_field() {
        let ok = |amount, card, exp, cvv| can_submit(amount, card, exp, "2025-06", cvv);
        assert!(ok(10.0, "4111111111111111", "2030-01", "123"));
        assert!(!ok(0.0, "4111111111111111", "2030-01", "123"));
        assert!(!ok(-1.0, "4111111111111111", "2030-01", "123"));
        assert!(!ok(f64::NAN, "4111111111111111", "2030-01", "123"));
        assert!(!ok(10.0, "4111111111111112", "2030-01", "123"));
        assert!(!ok(10.0, "4111111111111111", "2020-01", "123"));
        assert!(!ok(10.0, "4111111111111111", "2030-01", "12"));
    }

    #[test]
    fn test_current_year_month_shape() {
        assert!(is_year_month(&current_year_month()));
    }

    #[test]
    fn test_card_draft() {
        let draft = CardDraft {
            card_number: "4111 1111 1111 1111".into(),
            expiration: "2030-01".into(),
            cvv: "123".into(),
            balance: "1500.50".into(),
            active: true,
        };
        assert!(draft.can_save());
        assert_eq!(draft.digits(), "4111111111111111");
        assert_eq!(draft.parsed_balance(), Some(1500.5));

        let empty = CardDraft::default();
        assert_eq!(
            empty.invalid_fields(),
            vec!["card_number", "expiration", "cvv", "balance"]
        );
    }

    fn luhn_check_digit(body: &[u8]) -> u8 {
        // Check digit that makes body + digit pass.
        let sum: u32 = body
            .iter()
            .rev()
            .enumerate()
            .map(|(i, &d)| {
                let n = u32::from(d);
                if i % 2 == 0 {
                    let d2 = n * 2;
                    if d2 > 9 {
                        d2 - 9
                    } else {
                        d2
                    }
                } else {
                    n
                }
            })
            .sum();
        ((10 - sum % 10) % 10) as u8
    }

    fn to_string(digits: &[u8]) -> String {
        digits.iter().map(|d| char::from(b'0' + d)).collect()
    }

    proptest! {
        #[test]
        fn prop_luhn_accepts_valid_numbers(body in prop::collection::vec(0u8..10, 12..19)) {
            let mut digits = body.clone();
            digits.push(luhn_check_digit(&body));
            prop_assert!(luhn_check(&to_string(&digits)));
        }

        #[test]
        fn prop_luhn_detects_single_digit_errors(
            body in prop::collection::vec(0u8..10, 12..19),
            pos in any::<prop::sample::Index>(),
            delta in 1u8..10,
        ) {
            let mut digits = body.clone();
            digits.push(luhn_check_digit(&body));
            let i = pos.index(digits.len());
            digits[i] = (digits[i] + delta) % 10;
            prop_assert!(!luhn_check(&to_string(&digits)));
        }
    }
}
