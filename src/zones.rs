//! Multi-zone (DMA) analysis: per-zone balances, the utility-level aggregate,
//! ranking and intervention priorities.

use crate::benchmark::{classify, NRW_PERCENT_THRESHOLDS};
use crate::calculator::calculate;
use crate::types::{BalanceResult, Percentages, Zone};
use log::debug;
use serde::Serialize;
use std::cmp::Ordering;
use thiserror::Error;

/// How many ranked zones get an intervention recommendation.
pub const PRIORITY_ZONE_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneResult {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub result: BalanceResult,
}

/// Component totals across all zones.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateComponents {
    pub siv: f64,
    pub billed_authorized: f64,
    pub unbilled_authorized: f64,
    pub nrw: f64,
    pub real_losses: f64,
    pub apparent_losses: f64,
    pub customers: i64,
    pub pipe_length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateKpis {
    pub nrw_percent: f64,
    pub real_losses_per_km_per_day: f64,
    pub nrw_per_connection_per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub components: AggregateComponents,
    pub percentages: Percentages,
    pub kpis: AggregateKpis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneAnalysis {
    pub zones: Vec<ZoneResult>,
    /// Descending NRW %, ties in input order.
    pub ranked_zones: Vec<ZoneResult>,
    pub pdam_aggregate: AggregateResult,
    pub zone_count: usize,
}

/// Calculate every zone independently, aggregate and rank.
pub fn aggregate_zones(zones: &[Zone]) -> ZoneAnalysis {
    let results: Vec<ZoneResult> = zones
        .iter()
        .enumerate()
        .map(|(index, zone)| ZoneResult {
            id: if zone.id.is_empty() {
                format!("zone-{}", index)
            } else {
                zone.id.clone()
            },
            name: zone.name.clone(),
            result: calculate(&zone.data),
        })
        .collect();

    let pdam_aggregate = aggregate_results(&results);

    let mut ranked_zones = results.clone();
    // `sort_by` is stable, so equal NRW keeps the original order.
    ranked_zones.sort_by(|a, b| {
        b.result
            .percentages
            .nrw
            .partial_cmp(&a.result.percentages.nrw)
            .unwrap_or(Ordering::Equal)
    });

    debug!(
        "aggregated {} zones: nrw={} ({:.2}%)",
        results.len(),
        pdam_aggregate.components.nrw,
        pdam_aggregate.percentages.nrw
    );

    ZoneAnalysis {
        zone_count: zones.len(),
        zones: results,
        ranked_zones,
        pdam_aggregate,
    }
}

/// Sum zone volumes and recompute ratios from the totals (never averages of
/// per-zone ratios).
pub fn aggregate_results(results: &[ZoneResult]) -> AggregateResult {
    let totals = results
        .iter()
        .fold(AggregateComponents::default(), |mut acc, zone| {
            let c = &zone.result.components;
            acc.siv += c.system_input_volume;
            acc.billed_authorized += c.billed_authorized;
            acc.unbilled_authorized += c.unbilled_authorized;
            acc.nrw += c.nrw;
            acc.real_losses += c.real_losses;
            acc.apparent_losses += c.apparent_losses;
            acc.customers += zone.result.input.customers;
            acc.pipe_length += zone.result.input.pipe_length;
            acc
        });

    let percentages = Percentages::of_input(
        totals.siv,
        totals.nrw,
        totals.billed_authorized,
        totals.apparent_losses,
        totals.real_losses,
    );
    let real_losses_per_km_per_day = if totals.pipe_length > 0.0 {
        totals.real_losses / (totals.pipe_length * 365.0)
    } else {
        0.0
    };
    let nrw_per_connection_per_day = if totals.customers > 0 {
        totals.nrw * 1000.0 / (totals.customers as f64 * 365.0)
    } else {
        0.0
    };

    AggregateResult {
        kpis: AggregateKpis {
            nrw_percent: percentages.nrw,
            real_losses_per_km_per_day,
            nrw_per_connection_per_day,
        },
        components: totals,
        percentages,
    }
}

/// Positional priority: the worst zone is critical, the next high, the rest
/// medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Priority {
    #[serde(rename = "Kritis")]
    Critical,
    #[serde(rename = "Tinggi")]
    High,
    #[serde(rename = "Sedang")]
    Medium,
}

impl Priority {
    pub fn for_position(index: usize) -> Self {
        match index {
            0 => Priority::Critical,
            1 => Priority::High,
            _ => Priority::Medium,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Critical => "Kritis",
            Priority::High => "Tinggi",
            Priority::Medium => "Sedang",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Intervention {
    #[serde(rename = "Deteksi kebocoran aktif & pressure management")]
    LeakDetection,
    #[serde(rename = "Penggantian meter & penertiban pelanggan")]
    MeterReplacement,
    #[serde(rename = "Kombinasi: perbaikan pipa & audit meter")]
    Combined,
}

impl Intervention {
    /// Real losses more than twice apparent point at leaks; apparent above
    /// real points at meters and illegal connections. Anything else,
    /// including ties, gets the combined program.
    pub fn recommend(real_losses_percent: f64, apparent_losses_percent: f64) -> Self {
        if real_losses_percent > apparent_losses_percent * 2.0 {
            Intervention::LeakDetection
        } else if apparent_losses_percent > real_losses_percent {
            Intervention::MeterReplacement
        } else {
            Intervention::Combined
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Intervention::LeakDetection => "Deteksi kebocoran aktif & pressure management",
            Intervention::MeterReplacement => "Penggantian meter & penertiban pelanggan",
            Intervention::Combined => "Kombinasi: perbaikan pipa & audit meter",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityEntry {
    pub rank: usize,
    pub zone_name: String,
    pub nrw_percent: f64,
    pub priority: Priority,
    pub intervention: Intervention,
    /// Zone NRW volume, m³/year.
    pub estimated_loss: f64,
}

pub fn identify_priority_zones(ranked_zones: &[ZoneResult]) -> Vec<PriorityEntry> {
    ranked_zones
        .iter()
        .take(PRIORITY_ZONE_COUNT)
        .enumerate()
        .map(|(index, zone)| {
            let pct = &zone.result.percentages;
            PriorityEntry {
                rank: index + 1,
                zone_name: zone.name.clone(),
                nrw_percent: pct.nrw,
                priority: Priority::for_position(index),
                intervention: Intervention::recommend(
                    pct.real_losses_percent,
                    pct.apparent_losses_percent,
                ),
                estimated_loss: zone.result.components.nrw,
            }
        })
        .collect()
}

/// Flattened per-zone view used for comparison charts and tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneComparison {
    pub name: String,
    pub nrw: f64,
    pub real: f64,
    pub apparent: f64,
    pub customers: i64,
    pub severity: &'static str,
}

pub fn create_zone_comparison(zones: &[ZoneResult]) -> Vec<ZoneComparison> {
    zones
        .iter()
        .map(|zone| {
            let pct = &zone.result.percentages;
            ZoneComparison {
                name: zone.name.clone(),
                nrw: pct.nrw,
                real: pct.real_losses_percent,
                apparent: pct.apparent_losses_percent,
                customers: zone.result.input.customers,
                severity: classify(pct.nrw, NRW_PERCENT_THRESHOLDS).severity_key(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ZoneError {
    #[error("Nama zona tidak boleh kosong")]
    EmptyName,
    #[error("SIV harus berupa angka positif")]
    InvalidInputVolume,
    #[error("Volume Terjual harus berupa angka positif")]
    InvalidBilledVolume,
    #[error("Volume Terjual tidak boleh lebih besar dari SIV")]
    BilledExceedsInput,
}

/// Minimal structural check for a zone record (name, SIV, billed volume).
pub fn validate_zone(zone: &Zone) -> Result<(), Vec<ZoneError>> {
    let mut errors = Vec::new();
    if zone.name.trim().is_empty() {
        errors.push(ZoneError::EmptyName);
    }

    let siv = zone.data.system_input_volume.as_ref().and_then(|v| v.as_f64());
    let billed = zone.data.billed_metered.as_ref().and_then(|v| v.as_f64());

    if !siv.is_some_and(|v| v > 0.0) {
        errors.push(ZoneError::InvalidInputVolume);
    }
    if !billed.is_some_and(|v| v > 0.0) {
        errors.push(ZoneError::InvalidBilledVolume);
    }
    if let (Some(siv), Some(billed)) = (siv, billed) {
        if billed > siv {
            errors.push(ZoneError::BilledExceedsInput);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BalanceInput;
    use pretty_assertions::assert_eq;

    fn zone(name: &str, siv: f64, billed: f64) -> Zone {
        Zone {
            id: String::new(),
            name: name.to_string(),
            data: BalanceInput {
                system_input_volume: Some(siv.into()),
                billed_metered: Some(billed.into()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn aggregate_recomputes_percentage_from_totals() {
        let analysis = aggregate_zones(&[zone("A", 100_000.0, 70_000.0), zone("B", 200_000.0, 140_000.0)]);
        let agg = &analysis.pdam_aggregate;
        assert_eq!(agg.components.siv, 300_000.0);
        assert_eq!(agg.components.nrw, 90_000.0);
        assert!((agg.percentages.nrw - 30.0).abs() < 1e-9);
        assert_eq!(agg.kpis.nrw_percent, agg.percentages.nrw);
        assert_eq!(analysis.zone_count, 2);
    }

    #[test]
    fn aggregate_is_volume_weighted() {
        // 10% of 1,000,000 and 50% of 100,000: mean would be 30%, weighted is ~13.6%.
        let analysis = aggregate_zones(&[zone("Big", 1_000_000.0, 900_000.0), zone("Small", 100_000.0, 50_000.0)]);
        let pct = analysis.pdam_aggregate.percentages.nrw;
        assert!((pct - 150_000.0 / 1_100_000.0 * 100.0).abs() < 1e-9);
        assert!((pct - 30.0).abs() > 1.0);
    }

    #[test]
    fn aggregate_kpis_use_summed_network() {
        let mut a = zone("A", 365_000.0, 182_500.0);
        a.data.number_of_customers = Some(100.0.into());
        a.data.pipe_length_km = Some(10.0.into());
        let mut b = zone("B", 365_000.0, 182_500.0);
        b.data.number_of_customers = Some(100.0.into());
        b.data.pipe_length_km = Some(40.0.into());
        let agg = aggregate_zones(&[a, b]).pdam_aggregate;
        assert_eq!(agg.components.customers, 200);
        assert_eq!(agg.components.pipe_length, 50.0);
        assert!((agg.kpis.nrw_per_connection_per_day - 5000.0).abs() < 1e-9);
        assert!((agg.kpis.real_losses_per_km_per_day - 365_000.0 / (50.0 * 365.0)).abs() < 1e-9);
    }

    #[test]
    fn ranking_is_descending_and_stable() {
        let zones = vec![
            zone("Twenty", 100.0, 80.0),
            zone("Fifty", 100.0, 50.0),
            zone("ThirtyFiveA", 100.0, 65.0),
            zone("ThirtyFiveB", 100.0, 65.0),
        ];
        let analysis = aggregate_zones(&zones);
        let names: Vec<_> = analysis.ranked_zones.iter().map(|z| z.name.as_str()).collect();
        assert_eq!(names, ["Fifty", "ThirtyFiveA", "ThirtyFiveB", "Twenty"]);
        // input order preserved in `zones`
        assert_eq!(analysis.zones[0].name, "Twenty");
        assert_eq!(analysis.zones[0].id, "zone-0");
    }

    #[test]
    fn empty_zone_list() {
        let analysis = aggregate_zones(&[]);
        assert_eq!(analysis.zone_count, 0);
        assert_eq!(analysis.pdam_aggregate.percentages.nrw, 0.0);
        assert!(identify_priority_zones(&analysis.ranked_zones).is_empty());
    }

    #[test]
    fn priorities_are_positional_and_capped() {
        let zones: Vec<Zone> = (0..7)
            .map(|i| zone(&format!("Z{}", i), 100.0, 40.0 + i as f64))
            .collect();
        let analysis = aggregate_zones(&zones);
        let priorities = identify_priority_zones(&analysis.ranked_zones);
        assert_eq!(priorities.len(), PRIORITY_ZONE_COUNT);
        assert_eq!(priorities[0].rank, 1);
        assert_eq!(priorities[0].zone_name, "Z0");
        assert_eq!(priorities[0].priority, Priority::Critical);
        assert_eq!(priorities[1].priority, Priority::High);
        assert!(priorities[2..].iter().all(|p| p.priority == Priority::Medium));
        assert_eq!(priorities[0].estimated_loss, 60.0);
    }

    #[test]
    fn intervention_rules() {
        assert_eq!(Intervention::recommend(25.0, 5.0), Intervention::LeakDetection);
        assert_eq!(Intervention::recommend(5.0, 10.0), Intervention::MeterReplacement);
        assert_eq!(Intervention::recommend(10.0, 5.0), Intervention::Combined);
        assert_eq!(Intervention::recommend(8.0, 8.0), Intervention::Combined);
        assert_eq!(Intervention::recommend(0.0, 0.0), Intervention::Combined);
    }

    #[test]
    fn priority_entry_serializes_labels() {
        let analysis = aggregate_zones(&[zone("A", 100_000.0, 60_000.0)]);
        let p = identify_priority_zones(&analysis.ranked_zones);
        let v = serde_json::to_value(&p[0]).unwrap();
        assert_eq!(v["priority"], "Kritis");
        assert_eq!(v["zoneName"], "A");
        assert_eq!(v["intervention"], Intervention::LeakDetection.label());
    }

    #[test]
    fn comparison_uses_nrw_severity() {
        let analysis = aggregate_zones(&[zone("A", 100.0, 85.0), zone("B", 100.0, 55.0)]);
        let cmp = create_zone_comparison(&analysis.ranked_zones);
        assert_eq!(cmp[0].name, "B");
        assert_eq!(cmp[0].severity, "critical");
        assert_eq!(cmp[1].severity, "excellent");
    }

    #[test]
    fn zone_validation() {
        assert_eq!(validate_zone(&zone("A", 100.0, 80.0)), Ok(()));
        assert_eq!(
            validate_zone(&zone(" ", 100.0, 120.0)),
            Err(vec![ZoneError::EmptyName, ZoneError::BilledExceedsInput])
        );
        let empty = Zone {
            name: "Kosong".into(),
            ..Default::default()
        };
        assert_eq!(
            validate_zone(&empty),
            Err(vec![ZoneError::InvalidInputVolume, ZoneError::InvalidBilledVolume])
        );
    }
}
