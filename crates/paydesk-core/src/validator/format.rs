//! Display helpers for card numbers.

use super::normalize_digits;

/// Longest card number (ISO/IEC 7812).
pub const MAX_CARD_DIGITS: usize = 19;

/// Group digits by four, truncated to [`MAX_CARD_DIGITS`].
pub fn format_card_number(input: &str) -> String {
    let digits = normalize_digits(input);
    let digits = &digits[..digits.len().min(MAX_CARD_DIGITS)];

    digits
        .as_bytes()
        .chunks(4)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Hide all but the last four digits.
pub fn mask_card_number(input: &str) -> String {
    let digits = normalize_digits(input);
    let visible = digits.len().saturating_sub(4);
    let masked: String = "•".repeat(visible) + &digits[visible..];
    format_masked(&masked)
}

fn format_masked(masked: &str) -> String {
    let chars: Vec<char> = masked.chars().collect();
    chars
        .chunks(4)
        .map(|c| c.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_groups_of_four() {
        assert_eq!(format_card_number("4111111111111111"), "4111 1111 1111 1111");
        assert_eq!(format_card_number("378282246310005"), "3782 8224 6310 005");
        assert_eq!(format_card_number(""), "");
    }

    #[test]
    fn test_format_truncates_to_max_digits() {
        let formatted = format_card_number("12345678901234567890123");
        assert_eq!(formatted, "1234 5678 9012 3456 789");
    }

    #[test]
    fn test_mask_keeps_last_four() {
        assert_eq!(mask_card_number("4111111111111111"), "•••• •••• •••• 1111");
        assert_eq!(mask_card_number("123"), "123");
    }
}
