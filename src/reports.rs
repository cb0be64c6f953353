use crate::benchmark::{classify, Tier, NRW_PERCENT_THRESHOLDS};
use crate::types::{BalanceResult, KpiRow, PriorityRow, ZoneComparisonRow};
use crate::util::{format_int, format_number, format_rupiah};
use crate::zones::{create_zone_comparison, PriorityEntry, ZoneAnalysis};
use serde::Serialize;

/// Report 1: zones needing intervention, worst first.
pub fn priority_rows(priorities: &[PriorityEntry]) -> Vec<PriorityRow> {
    priorities
        .iter()
        .map(|p| PriorityRow {
            rank: p.rank,
            zone: p.zone_name.clone(),
            nrw_pct: format_number(p.nrw_percent, 1),
            priority: p.priority.label().to_string(),
            estimated_loss: format_number(p.estimated_loss, 0),
            intervention: p.intervention.label().to_string(),
        })
        .collect()
}

/// Report 2: every zone, ranked, with the loss split and NRW severity.
pub fn zone_comparison_rows(analysis: &ZoneAnalysis) -> Vec<ZoneComparisonRow> {
    create_zone_comparison(&analysis.ranked_zones)
        .into_iter()
        .map(|c| ZoneComparisonRow {
            zone: c.name,
            nrw_pct: format_number(c.nrw, 1),
            real_pct: format_number(c.real, 1),
            apparent_pct: format_number(c.apparent, 1),
            customers: format_int(c.customers),
            severity: c.severity.to_string(),
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct ZoneSummary<'a> {
    pub zone_count: usize,
    pub aggregate_nrw_percent: f64,
    pub aggregate_nrw_volume: f64,
    pub aggregate_real_losses: f64,
    pub aggregate_apparent_losses: f64,
    pub aggregate_severity: &'static str,
    pub worst_zone: Option<&'a str>,
    pub priorities: &'a [PriorityEntry],
}

pub fn generate_zone_summary<'a>(
    analysis: &'a ZoneAnalysis,
    priorities: &'a [PriorityEntry],
) -> ZoneSummary<'a> {
    let agg = &analysis.pdam_aggregate;
    ZoneSummary {
        zone_count: analysis.zone_count,
        aggregate_nrw_percent: agg.percentages.nrw,
        aggregate_nrw_volume: agg.components.nrw,
        aggregate_real_losses: agg.components.real_losses,
        aggregate_apparent_losses: agg.components.apparent_losses,
        aggregate_severity: classify(agg.percentages.nrw, NRW_PERCENT_THRESHOLDS).severity_key(),
        worst_zone: analysis.ranked_zones.first().map(|z| z.name.as_str()),
        priorities,
    }
}

fn tier_label(tier: Option<Tier>) -> String {
    tier.map(|t| t.label().to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Single-utility KPI sheet.
pub fn utility_kpi_rows(result: &BalanceResult) -> Vec<KpiRow> {
    let k = &result.kpis;
    let b = &result.benchmark.details;
    let f = &result.financial_impact;
    let c = &result.components;
    let row = |metric: &str, value: String, tier: Option<Tier>| KpiRow {
        metric: metric.to_string(),
        value,
        benchmark: tier_label(tier),
    };
    vec![
        row("System Input Volume (m³/thn)", format_number(c.system_input_volume, 0), None),
        row("NRW (m³/thn)", format_number(c.nrw, 0), None),
        row("NRW (%)", format_number(k.nrw_percent, 1), Some(b.nrw)),
        row("Real Losses (m³/thn)", format_number(c.real_losses, 0), None),
        row("Apparent Losses (m³/thn)", format_number(c.apparent_losses, 0), None),
        row(
            "NRW per sambungan (L/sambungan/hari)",
            format_number(k.nrw_per_connection_per_day, 1),
            Some(b.l_per_connection_per_day),
        ),
        row(
            "Real losses per km (m³/km/hari)",
            format_number(k.real_losses_per_km_per_day, 2),
            Some(b.m3_per_km_per_day),
        ),
        row(
            "ILI",
            k.ili.map(|v| format_number(v, 2)).unwrap_or_else(|| "-".to_string()),
            b.ili,
        ),
        row("Kehilangan pendapatan", format_rupiah(f.lost_revenue), None),
        row("Total kerugian tahunan", format_rupiah(f.total_annual_loss), None),
        row("Potensi pemulihan (50%)", format_rupiah(f.potential_recovery_50pct), None),
        row("Kinerja keseluruhan", String::new(), Some(result.benchmark.overall)),
    ]
}
