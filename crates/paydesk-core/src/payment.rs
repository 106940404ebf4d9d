//! Payment creation form.
//!
//! Holds the raw text of each field and recomputes validity on every check;
//! nothing is cached between checks.

use serde::Serialize;

use crate::error::{PaydeskError, PaydeskResult};
use crate::types::PaymentRequest;
use crate::validator::{
    cvv_valid, detect_brand, expiry_valid, format_card_number, luhn_check, normalize_digits,
    CardBrand,
};

/// Currency of every amount handled by the console.
pub const CURRENCY: &str = "MAD";

/// VAT share of a tax-inclusive total.
pub const VAT_RATE: f64 = 0.20;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentForm {
    pub amount: String,
    pub card_number: String,
    /// `YYYY-MM`.
    pub expiration: String,
    pub cvv: String,
}

/// Per-field validity of a [`PaymentForm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormCheck {
    pub brand: CardBrand,
    pub amount_valid: bool,
    pub card_valid: bool,
    pub expiry_valid: bool,
    pub cvv_valid: bool,
}

impl FormCheck {
    /// All four fields valid together.
    pub fn can_submit(&self) -> bool {
        self.amount_valid && self.card_valid && self.expiry_valid && self.cvv_valid
    }

    pub fn invalid_fields(&self) -> Vec<&'static str> {
        [
            ("amount", self.amount_valid),
            ("card_number", self.card_valid),
            ("expiration", self.expiry_valid),
            ("cvv", self.cvv_valid),
        ]
        .into_iter()
        .filter(|(_, ok)| !ok)
        .map(|(name, _)| name)
        .collect()
    }
}

/// Split of a tax-inclusive total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmountBreakdown {
    pub net: f64,
    pub vat: f64,
    pub total: f64,
}

impl AmountBreakdown {
    pub fn from_total(total: f64) -> Self {
        Self {
            net: total * (1.0 - VAT_RATE),
            vat: total * VAT_RATE,
            total,
        }
    }
}

impl PaymentForm {
    pub fn new(
        amount: impl Into<String>,
        card_number: impl Into<String>,
        expiration: impl Into<String>,
        cvv: impl Into<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            card_number: card_number.into(),
            expiration: expiration.into(),
            cvv: cvv.into(),
        }
    }

    /// Amount as a number, if it parses to a finite value.
    pub fn parsed_amount(&self) -> Option<f64> {
        self.amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite())
    }

    /// Validate every field against `reference` (`YYYY-MM`).
    pub fn check(&self, reference: &str) -> FormCheck {
        FormCheck {
            brand: detect_brand(&self.card_number),
            amount_valid: self.parsed_amount().is_some_and(|a| a > 0.0),
            card_valid: luhn_check(&self.card_number),
            expiry_valid: expiry_valid(self.expiration.trim(), reference),
            cvv_valid: cvv_valid(self.cvv.trim()),
        }
    }

    /// Build the wire payload; fails listing every invalid field.
    pub fn to_request(&self, reference: &str) -> PaydeskResult<PaymentRequest> {
        let check = self.check(reference);
        if !check.can_submit() {
            return Err(PaydeskError::Validation {
                fields: check.invalid_fields(),
            });
        }

        Ok(PaymentRequest {
            montant: self.parsed_amount().unwrap_or_default(),
            numero_carte: normalize_digits(&self.card_number),
            expiration: self.expiration.trim().to_string(),
            cvv: self.cvv.trim().to_string(),
        })
    }

    /// Order summary; an unparseable amount counts as zero.
    pub fn summary(&self) -> AmountBreakdown {
        AmountBreakdown::from_total(self.parsed_amount().unwrap_or(0.0))
    }

    pub fn display_card_number(&self) -> String {
        format_card_number(&self.card_number)
    }

    /// `YYYY/MM` for display.
    pub fn display_expiration(&self) -> String {
        self.expiration.trim().replace('-', "/")
    }
}
