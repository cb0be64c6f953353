use crate::benchmark::Benchmark;
use crate::calculator::BalanceWarning;
use crate::util::{parse_count_safe, parse_f64_safe};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

pub const DEFAULT_AVERAGE_TARIFF: f64 = 5000.0;
pub const DEFAULT_PRODUCTION_COST: f64 = 3000.0;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// A raw numeric field as entered in a form or stored in a draft: either a
/// JSON number or the text the user typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// `None` when the value is not a finite number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) if v.is_finite() => Some(*v),
            FieldValue::Number(_) => None,
            FieldValue::Text(s) => parse_f64_safe(Some(s)),
        }
    }

    pub fn as_count(&self) -> Option<i64> {
        match self {
            FieldValue::Number(v) if v.is_finite() => Some(v.trunc() as i64),
            FieldValue::Number(_) => None,
            FieldValue::Text(s) => parse_count_safe(Some(s)),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

/// Per-entity (whole utility or single DMA zone) measurements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BalanceInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_input_volume: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billed_metered: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billed_unmetered: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unbilled_metered: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unbilled_unmetered: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_customers: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipe_length_km: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_pressure: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_tariff: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_cost: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unauthorized_pct: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meter_inaccuracy_pct: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_errors: Option<FieldValue>,
}

/// Number with fallback: missing, unparseable or zero values take `default`.
fn number_or(field: &Option<FieldValue>, default: f64) -> f64 {
    field
        .as_ref()
        .and_then(FieldValue::as_f64)
        .filter(|v| *v != 0.0)
        .unwrap_or(default)
}

fn count_or_zero(field: &Option<FieldValue>) -> i64 {
    field.as_ref().and_then(FieldValue::as_count).unwrap_or(0)
}

impl BalanceInput {
    /// Resolve every field to a number, applying the documented defaults.
    pub fn parse(&self) -> ParsedInput {
        ParsedInput {
            siv: number_or(&self.system_input_volume, 0.0),
            billed_metered: number_or(&self.billed_metered, 0.0),
            billed_unmetered: number_or(&self.billed_unmetered, 0.0),
            unbilled_metered: number_or(&self.unbilled_metered, 0.0),
            unbilled_unmetered: number_or(&self.unbilled_unmetered, 0.0),
            customers: count_or_zero(&self.number_of_customers),
            pipe_length_km: number_or(&self.pipe_length_km, 0.0),
            average_pressure: number_or(&self.average_pressure, 0.0),
            average_tariff: number_or(&self.average_tariff, DEFAULT_AVERAGE_TARIFF),
            production_cost: number_or(&self.production_cost, DEFAULT_PRODUCTION_COST),
            unauthorized_pct: number_or(&self.unauthorized_pct, 0.0),
            meter_inaccuracy_pct: number_or(&self.meter_inaccuracy_pct, 0.0),
            data_errors: number_or(&self.data_errors, 0.0),
        }
    }
}

/// `BalanceInput` with every field resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedInput {
    pub siv: f64,
    pub billed_metered: f64,
    pub billed_unmetered: f64,
    pub unbilled_metered: f64,
    pub unbilled_unmetered: f64,
    pub customers: i64,
    pub pipe_length_km: f64,
    pub average_pressure: f64,
    pub average_tariff: f64,
    pub production_cost: f64,
    pub unauthorized_pct: f64,
    pub meter_inaccuracy_pct: f64,
    pub data_errors: f64,
}

/// A District Metered Area owned by the caller's zone collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub data: BalanceInput,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSummary {
    pub siv: f64,
    pub billed_metered: f64,
    pub billed_unmetered: f64,
    pub customers: i64,
    pub pipe_length: f64,
}

/// IWA water balance components, all in m³/year.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    pub system_input_volume: f64,
    pub billed_authorized: f64,
    pub unbilled_authorized: f64,
    pub authorized_consumption: f64,
    pub nrw: f64,
    pub water_losses: f64,
    pub apparent_losses: f64,
    pub real_losses: f64,
}

/// Shares of system input volume, in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Percentages {
    pub nrw: f64,
    pub revenue_water: f64,
    pub apparent_losses_percent: f64,
    pub real_losses_percent: f64,
}

impl Percentages {
    pub fn of_input(siv: f64, nrw: f64, billed_authorized: f64, apparent: f64, real: f64) -> Self {
        let share = |v: f64| if siv > 0.0 { v / siv * 100.0 } else { 0.0 };
        Percentages {
            nrw: share(nrw),
            revenue_water: share(billed_authorized),
            apparent_losses_percent: share(apparent),
            real_losses_percent: share(real),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub nrw_percent: f64,
    /// Litres per connection per day.
    pub nrw_per_connection_per_day: f64,
    /// m³ per km of mains per day.
    pub real_losses_per_km_per_day: f64,
    /// `None` when pipe length, customers or pressure is missing.
    pub ili: Option<f64>,
    pub carl: f64,
}

/// Annual financial impact in Rupiah.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialImpact {
    pub lost_revenue: f64,
    pub wasted_production_cost: f64,
    pub total_annual_loss: f64,
    pub potential_recovery_50pct: f64,
    pub average_tariff: f64,
    pub production_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultValidation {
    pub is_valid: bool,
    pub warnings: Vec<BalanceWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResult {
    pub input: InputSummary,
    pub components: Components,
    pub percentages: Percentages,
    pub kpis: Kpis,
    pub benchmark: Benchmark,
    pub financial_impact: FinancialImpact,
    pub validation: ResultValidation,
}

// ---------------------------------------------------------------------------
// Report rows
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PriorityRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Zone")]
    #[tabled(rename = "Zone")]
    pub zone: String,
    #[serde(rename = "NrwPct")]
    #[tabled(rename = "NrwPct")]
    pub nrw_pct: String,
    #[serde(rename = "Priority")]
    #[tabled(rename = "Priority")]
    pub priority: String,
    #[serde(rename = "EstimatedLossM3")]
    #[tabled(rename = "EstimatedLossM3")]
    pub estimated_loss: String,
    #[serde(rename = "Intervention")]
    #[tabled(rename = "Intervention")]
    pub intervention: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ZoneComparisonRow {
    #[serde(rename = "Zone")]
    #[tabled(rename = "Zone")]
    pub zone: String,
    #[serde(rename = "NrwPct")]
    #[tabled(rename = "NrwPct")]
    pub nrw_pct: String,
    #[serde(rename = "RealLossPct")]
    #[tabled(rename = "RealLossPct")]
    pub real_pct: String,
    #[serde(rename = "ApparentLossPct")]
    #[tabled(rename = "ApparentLossPct")]
    pub apparent_pct: String,
    #[serde(rename = "Customers")]
    #[tabled(rename = "Customers")]
    pub customers: String,
    #[serde(rename = "Severity")]
    #[tabled(rename = "Severity")]
    pub severity: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiRow {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "Benchmark")]
    #[tabled(rename = "Benchmark")]
    pub benchmark: String,
}
