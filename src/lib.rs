//! Non-revenue water balance for water utilities, following the IWA
//! water-balance methodology.
//!
//! The flow for a single entity is validate-then-calculate:
//!
//! ```
//! use nrw_balance::{calculate, validate, BalanceInput};
//!
//! let input: BalanceInput = serde_json::from_str(
//!     r#"{"systemInputVolume": "1000000", "billedMetered": 650000, "numberOfCustomers": 10000}"#,
//! ).unwrap();
//! assert!(validate(&input).is_valid);
//! let result = calculate(&input);
//! assert_eq!(result.components.nrw, 350_000.0);
//! ```
//!
//! Zone (DMA) collections go through [`zones::aggregate_zones`] and
//! [`zones::identify_priority_zones`].

pub mod benchmark;
pub mod calculator;
pub mod config;
pub mod context;
pub mod draft;
pub mod error;
pub mod ili;
pub mod loader;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;
pub mod validator;
pub mod zones;

pub use benchmark::{classify, Tier};
pub use calculator::calculate;
pub use context::{CalculationContext, Evaluation, Mode};
pub use error::{Error, Result};
pub use ili::estimate_ili;
pub use loader::import_zones_from_csv;
pub use types::{BalanceInput, BalanceResult, FieldValue, Zone};
pub use validator::{validate, ValidationReport};
pub use zones::{aggregate_zones, identify_priority_zones, ZoneAnalysis};
