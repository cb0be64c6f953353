//! Pre-calculation input checks.
//!
//! Errors here mean the balance would be meaningless and must not be
//! computed. Warnings flag suspicious units but do not block.

use crate::types::BalanceInput;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Minimum plausible system input per customer, m³/year.
pub const MIN_SIV_PER_CUSTOMER: f64 = 10.0;
/// Maximum plausible system input per customer, m³/year.
pub const MAX_SIV_PER_CUSTOMER: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("System Input Volume wajib diisi dan harus lebih dari 0")]
    MissingSystemInput,
    #[error("Billed Metered Consumption tidak boleh negatif")]
    NegativeBilledMetered,
    #[error("Jumlah Pelanggan wajib diisi")]
    MissingCustomers,
    #[error("Billed Metered tidak boleh melebihi System Input Volume")]
    BilledMeteredExceedsInput,
    #[error("Billed Unmetered tidak boleh melebihi System Input Volume")]
    BilledUnmeteredExceedsInput,
    #[error("Total konsumsi resmi tidak boleh melebihi System Input Volume")]
    AuthorizedExceedsInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputWarning {
    #[error("SIV terlalu rendah untuk jumlah pelanggan. Periksa satuan data.")]
    InputPerCustomerTooLow,
    #[error("SIV terlalu tinggi per pelanggan. Periksa satuan data.")]
    InputPerCustomerTooHigh,
}

fn serialize_messages<S, T>(items: &[T], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: std::fmt::Display,
{
    serializer.collect_seq(items.iter().map(|i| i.to_string()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    #[serde(serialize_with = "serialize_messages")]
    pub errors: Vec<InputError>,
    #[serde(serialize_with = "serialize_messages")]
    pub warnings: Vec<InputWarning>,
}

impl ValidationReport {
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

pub fn validate(input: &BalanceInput) -> ValidationReport {
    let p = input.parse();
    let siv = p.siv;
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if siv <= 0.0 {
        errors.push(InputError::MissingSystemInput);
    }
    if p.billed_metered < 0.0 {
        errors.push(InputError::NegativeBilledMetered);
    }
    if p.customers <= 0 {
        errors.push(InputError::MissingCustomers);
    }

    if siv > 0.0 {
        if p.billed_metered > siv {
            errors.push(InputError::BilledMeteredExceedsInput);
        }
        if p.billed_unmetered > siv {
            errors.push(InputError::BilledUnmeteredExceedsInput);
        }
        let total_authorized =
            p.billed_metered + p.billed_unmetered + p.unbilled_metered + p.unbilled_unmetered;
        if total_authorized > siv {
            errors.push(InputError::AuthorizedExceedsInput);
        }
    }

    if siv > 0.0 && p.customers > 0 {
        let per_customer = siv / p.customers as f64;
        if per_customer < MIN_SIV_PER_CUSTOMER {
            warnings.push(InputWarning::InputPerCustomerTooLow);
        }
        if per_customer > MAX_SIV_PER_CUSTOMER {
            warnings.push(InputWarning::InputPerCustomerTooHigh);
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}
