//! IWA water balance for a single reporting entity (whole utility or one zone).
//!
//! `calculate` is total: it never fails and never clamps. Impossible inputs
//! that reach it show up as error-level warnings on the result; rejecting them
//! up front is the job of `validator::validate`.

use crate::benchmark::classify_performance;
use crate::ili::estimate_ili;
use crate::types::{
    BalanceInput, BalanceResult, Components, FinancialImpact, InputSummary, Kpis, ParsedInput,
    Percentages, ResultValidation,
};
use log::debug;
use serde::{Serialize, Serializer};

/// Below this NRW % the figure is implausible for Indonesian utilities.
pub const LOW_NRW_PERCENT: f64 = 12.0;
/// Above this NRW % production metering is the likely culprit.
pub const HIGH_NRW_PERCENT: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningLevel {
    Error,
    Warning,
}

/// Post-calculation plausibility findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    BilledExceedsInput,
    NrwTooLow,
    NrwTooHigh,
    NegativeRealLosses,
}

impl WarningKind {
    pub fn level(self) -> WarningLevel {
        match self {
            WarningKind::BilledExceedsInput | WarningKind::NegativeRealLosses => {
                WarningLevel::Error
            }
            WarningKind::NrwTooLow | WarningKind::NrwTooHigh => WarningLevel::Warning,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            WarningKind::BilledExceedsInput => "billed_exceeds_input",
            WarningKind::NrwTooLow => "nrw_too_low",
            WarningKind::NrwTooHigh => "nrw_too_high",
            WarningKind::NegativeRealLosses => "negative_real_losses",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            WarningKind::BilledExceedsInput => {
                "Billed metered consumption tidak boleh lebih besar dari System Input Volume"
            }
            WarningKind::NrwTooLow => {
                "NRW sangat rendah untuk standar Indonesia (< 12%). Periksa data billing dan produksi."
            }
            WarningKind::NrwTooHigh => {
                "NRW sangat tinggi (> 60%). Periksa akurasi data flow meter produksi."
            }
            WarningKind::NegativeRealLosses => {
                "Real losses bernilai negatif. Data apparent losses mungkin terlalu tinggi."
            }
        }
    }
}

impl Serialize for WarningKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceWarning {
    pub kind: WarningKind,
    pub level: WarningLevel,
    pub message: String,
}

impl From<WarningKind> for BalanceWarning {
    fn from(kind: WarningKind) -> Self {
        BalanceWarning {
            kind,
            level: kind.level(),
            message: kind.message().to_string(),
        }
    }
}

pub fn generate_warnings(
    siv: f64,
    billed_metered: f64,
    nrw_percent: f64,
    real_losses: f64,
) -> Vec<BalanceWarning> {
    let checks = [
        (billed_metered > siv, WarningKind::BilledExceedsInput),
        (nrw_percent < LOW_NRW_PERCENT, WarningKind::NrwTooLow),
        (nrw_percent > HIGH_NRW_PERCENT, WarningKind::NrwTooHigh),
        (real_losses < 0.0, WarningKind::NegativeRealLosses),
    ];
    checks
        .into_iter()
        .filter(|(hit, _)| *hit)
        .map(|(_, kind)| BalanceWarning::from(kind))
        .collect()
}

/// Compute the full water balance for one entity.
pub fn calculate(input: &BalanceInput) -> BalanceResult {
    calculate_parsed(&input.parse())
}

pub fn calculate_parsed(p: &ParsedInput) -> BalanceResult {
    let siv = p.siv;

    let billed_authorized = p.billed_metered + p.billed_unmetered;
    let unbilled_authorized = p.unbilled_metered + p.unbilled_unmetered;
    let authorized_consumption = billed_authorized + unbilled_authorized;

    // NRW is measured against billed consumption only; unbilled authorized
    // use is removed later through water losses.
    let nrw = siv - billed_authorized;
    let nrw_percent = if siv > 0.0 { nrw / siv * 100.0 } else { 0.0 };

    let unauthorized_volume = siv * (p.unauthorized_pct / 100.0);
    let meter_inaccuracy_volume = p.billed_metered * (p.meter_inaccuracy_pct / 100.0);
    let apparent_losses = unauthorized_volume + meter_inaccuracy_volume + p.data_errors;

    let water_losses = siv - authorized_consumption;
    let real_losses = water_losses - apparent_losses;

    let nrw_per_connection_per_day = if p.customers > 0 {
        nrw * 1000.0 / (p.customers as f64 * 365.0)
    } else {
        0.0
    };
    let real_losses_per_km_per_day = if p.pipe_length_km > 0.0 {
        real_losses / (p.pipe_length_km * 365.0)
    } else {
        0.0
    };
    let ili = estimate_ili(real_losses, p.pipe_length_km, p.customers, p.average_pressure);

    let benchmark = classify_performance(
        nrw_percent,
        ili,
        real_losses_per_km_per_day,
        nrw_per_connection_per_day,
    );

    let lost_revenue = nrw * p.average_tariff;
    let wasted_production_cost = nrw * p.production_cost;

    debug!(
        "water balance: siv={} nrw={} ({:.2}%) real={} apparent={} ili={:?}",
        siv, nrw, nrw_percent, real_losses, apparent_losses, ili
    );

    BalanceResult {
        input: InputSummary {
            siv,
            billed_metered: p.billed_metered,
            billed_unmetered: p.billed_unmetered,
            customers: p.customers,
            pipe_length: p.pipe_length_km,
        },
        components: Components {
            system_input_volume: siv,
            billed_authorized,
            unbilled_authorized,
            authorized_consumption,
            nrw,
            water_losses,
            apparent_losses,
            real_losses,
        },
        percentages: Percentages::of_input(siv, nrw, billed_authorized, apparent_losses, real_losses),
        kpis: Kpis {
            nrw_percent,
            nrw_per_connection_per_day,
            real_losses_per_km_per_day,
            ili,
            carl: real_losses,
        },
        benchmark,
        financial_impact: FinancialImpact {
            lost_revenue,
            wasted_production_cost,
            total_annual_loss: lost_revenue + wasted_production_cost,
            potential_recovery_50pct: nrw * 0.5 * p.average_tariff,
            average_tariff: p.average_tariff,
            production_cost: p.production_cost,
        },
        validation: ResultValidation {
            is_valid: siv > 0.0 && p.billed_metered > 0.0,
            warnings: generate_warnings(siv, p.billed_metered, nrw_percent, real_losses),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::Tier;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn input(v: serde_json::Value) -> BalanceInput {
        serde_json::from_value(v).unwrap()
    }

    fn kinds(r: &BalanceResult) -> Vec<WarningKind> {
        r.validation.warnings.iter().map(|w| w.kind).collect()
    }

    #[test]
    fn basic_nrw() {
        let r = calculate(&input(json!({
            "systemInputVolume": 1000000,
            "billedMetered": 600000,
            "billedUnmetered": 50000,
            "unbilledMetered": 20000,
            "unbilledUnmetered": 30000,
            "numberOfCustomers": 10000,
            "pipeLengthKm": 100,
            "averagePressure": 3
        })));
        assert_eq!(r.components.billed_authorized, 650_000.0);
        assert_eq!(r.components.unbilled_authorized, 50_000.0);
        assert_eq!(r.components.authorized_consumption, 700_000.0);
        assert_eq!(r.components.nrw, 350_000.0);
        assert_eq!(r.percentages.nrw, 35.0);
        assert_eq!(r.percentages.revenue_water, 65.0);
        assert_eq!(r.kpis.nrw_percent, 35.0);
    }

    #[test]
    fn loss_decomposition() {
        let r = calculate(&input(json!({
            "systemInputVolume": 1000000,
            "billedMetered": 600000,
            "billedUnmetered": 50000,
            "unbilledMetered": 20000,
            "unbilledUnmetered": 30000,
            "numberOfCustomers": 5000,
            "pipeLengthKm": 50,
            "unauthorizedPct": 2,
            "meterInaccuracyPct": 3,
            "dataErrors": 5000
        })));
        assert_eq!(r.components.apparent_losses, 43_000.0);
        assert_eq!(r.components.water_losses, 300_000.0);
        assert_eq!(r.components.real_losses, 257_000.0);
        assert_eq!(r.kpis.carl, 257_000.0);
        // no pressure -> no ILI
        assert_eq!(r.kpis.ili, None);
        assert_eq!(r.benchmark.details.ili, None);
    }

    #[test]
    fn per_connection_and_per_km_kpis() {
        let r = calculate(&input(json!({
            "systemInputVolume": 365000,
            "billedMetered": 182500,
            "numberOfCustomers": 100,
            "pipeLengthKm": 50
        })));
        assert!((r.kpis.nrw_per_connection_per_day - 5000.0).abs() < 1e-9);
        assert!((r.kpis.real_losses_per_km_per_day - 182_500.0 / (50.0 * 365.0)).abs() < 1e-9);
    }

    #[test]
    fn zero_input_volume_gives_zero_percentages_and_invalid() {
        let r = calculate(&input(json!({
            "systemInputVolume": 0,
            "numberOfCustomers": 1000,
            "pipeLengthKm": 10
        })));
        assert_eq!(r.percentages.nrw, 0.0);
        assert_eq!(r.percentages.real_losses_percent, 0.0);
        assert!(!r.validation.is_valid);
    }

    #[test]
    fn financial_impact_uses_defaults() {
        let r = calculate(&input(json!({
            "systemInputVolume": 1000000,
            "billedMetered": 700000,
            "averageTariff": "",
            "productionCost": "not a number"
        })));
        let f = &r.financial_impact;
        assert_eq!(f.lost_revenue, 1_500_000_000.0);
        assert_eq!(f.wasted_production_cost, 900_000_000.0);
        assert_eq!(f.total_annual_loss, 2_400_000_000.0);
        assert_eq!(f.potential_recovery_50pct, 750_000_000.0);
        assert_eq!(f.average_tariff, 5000.0);
        assert_eq!(f.production_cost, 3000.0);
    }

    #[test]
    fn ili_present_with_full_network_data() {
        let r = calculate(&input(json!({
            "systemInputVolume": 1000000,
            "billedMetered": 600000,
            "billedUnmetered": 50000,
            "unbilledMetered": 20000,
            "unbilledUnmetered": 30000,
            "numberOfCustomers": 5000,
            "pipeLengthKm": 100,
            "averagePressure": 3.5,
            "unauthorizedPct": 2,
            "meterInaccuracyPct": 3,
            "dataErrors": 5000
        })));
        let ili = r.kpis.ili.unwrap();
        assert!(ili > 2.8 && ili < 3.0);
        assert_eq!(r.benchmark.details.ili, Some(Tier::Good));
    }

    #[test]
    fn nrw_tiers() {
        let excellent = calculate(&input(json!({"systemInputVolume": 1000000, "billedMetered": 850000})));
        assert_eq!(excellent.benchmark.details.nrw, Tier::Excellent);
        let critical = calculate(&input(json!({"systemInputVolume": 1000000, "billedMetered": 500000})));
        assert_eq!(critical.benchmark.details.nrw, Tier::Critical);
        assert_eq!(critical.benchmark.overall, Tier::Critical);
    }

    #[test]
    fn plausibility_warnings() {
        let low = calculate(&input(json!({"systemInputVolume": 1000000, "billedMetered": 900000})));
        assert_eq!(kinds(&low), vec![WarningKind::NrwTooLow]);
        assert_eq!(low.validation.warnings[0].level, WarningLevel::Warning);

        let high = calculate(&input(json!({"systemInputVolume": 1000000, "billedMetered": 350000})));
        assert_eq!(kinds(&high), vec![WarningKind::NrwTooHigh]);

        let over = calculate(&input(json!({"systemInputVolume": 1000000, "billedMetered": 1100000})));
        assert!(kinds(&over).contains(&WarningKind::BilledExceedsInput));
        assert!(over.validation.warnings.iter().any(|w| w.level == WarningLevel::Error
            && w.message.contains("tidak boleh lebih besar")));
    }

    #[test]
    fn negative_real_losses_are_reported_not_corrected() {
        let r = calculate(&input(json!({
            "systemInputVolume": 100000,
            "billedMetered": 75000,
            "unauthorizedPct": 30
        })));
        assert_eq!(r.components.real_losses, 25_000.0 - 30_000.0);
        assert!(kinds(&r).contains(&WarningKind::NegativeRealLosses));
    }

    #[test]
    fn warning_serializes_with_level_and_message() {
        let w: BalanceWarning = WarningKind::NrwTooHigh.into();
        let v = serde_json::to_value(&w).unwrap();
        assert_eq!(v["kind"], "nrw_too_high");
        assert_eq!(v["level"], "warning");
        assert!(v["message"].as_str().unwrap().starts_with("NRW sangat tinggi"));
    }

    #[test]
    fn result_exposes_stable_field_names() {
        let r = calculate(&input(json!({"systemInputVolume": 1000, "billedMetered": 700})));
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["percentages"]["nrw"], 30.0);
        assert_eq!(v["kpis"]["ili"], serde_json::Value::Null);
        assert!(v["financialImpact"]["totalAnnualLoss"].is_number());
        assert!(v["financialImpact"]["potentialRecovery50pct"].is_number());
        assert_eq!(v["validation"]["isValid"], true);
    }
}
