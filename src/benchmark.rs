//! Severity tiers and benchmark classification.

use serde::{Serialize, Serializer};

/// NRW as % of system input volume.
pub const NRW_PERCENT_THRESHOLDS: [f64; 3] = [20.0, 30.0, 40.0];
pub const ILI_THRESHOLDS: [f64; 3] = [2.0, 4.0, 8.0];
/// m³/km/day.
pub const REAL_LOSSES_PER_KM_THRESHOLDS: [f64; 3] = [5.0, 10.0, 20.0];
/// L/connection/day.
pub const NRW_PER_CONNECTION_THRESHOLDS: [f64; 3] = [50.0, 100.0, 200.0];

/// Performance tier, best to worst. Serializes as its level (0-3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Excellent,
    Good,
    Attention,
    Critical,
}

impl Tier {
    pub fn level(self) -> u8 {
        match self {
            Tier::Excellent => 0,
            Tier::Good => 1,
            Tier::Attention => 2,
            Tier::Critical => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Excellent => "Sangat Baik",
            Tier::Good => "Baik",
            Tier::Attention => "Perlu Perhatian",
            Tier::Critical => "Kritis",
        }
    }

    /// Lowercase key used for color coding.
    pub fn severity_key(self) -> &'static str {
        match self {
            Tier::Excellent => "excellent",
            Tier::Good => "good",
            Tier::Attention => "attention",
            Tier::Critical => "critical",
        }
    }
}

impl Serialize for Tier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.level())
    }
}

/// Map `value` onto a tier. Thresholds must be strictly increasing; a value
/// equal to a threshold falls into the worse tier.
pub fn classify(value: f64, thresholds: [f64; 3]) -> Tier {
    if value < thresholds[0] {
        Tier::Excellent
    } else if value < thresholds[1] {
        Tier::Good
    } else if value < thresholds[2] {
        Tier::Attention
    } else {
        Tier::Critical
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkDetails {
    pub nrw: Tier,
    pub ili: Option<Tier>,
    pub m3_per_km_per_day: Tier,
    pub l_per_connection_per_day: Tier,
}

impl BenchmarkDetails {
    fn available(&self) -> impl Iterator<Item = Tier> {
        [
            Some(self.nrw),
            self.ili,
            Some(self.m3_per_km_per_day),
            Some(self.l_per_connection_per_day),
        ]
        .into_iter()
        .flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Benchmark {
    /// Worst of the available tiers.
    pub overall: Tier,
    pub details: BenchmarkDetails,
}

pub fn classify_performance(
    nrw_percent: f64,
    ili: Option<f64>,
    m3_per_km_per_day: f64,
    l_per_connection_per_day: f64,
) -> Benchmark {
    let details = BenchmarkDetails {
        nrw: classify(nrw_percent, NRW_PERCENT_THRESHOLDS),
        ili: ili.map(|v| classify(v, ILI_THRESHOLDS)),
        m3_per_km_per_day: classify(m3_per_km_per_day, REAL_LOSSES_PER_KM_THRESHOLDS),
        l_per_connection_per_day: classify(l_per_connection_per_day, NRW_PER_CONNECTION_THRESHOLDS),
    };
    let overall = details.available().max().unwrap_or(Tier::Good);
    Benchmark { overall, details }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_goes_to_worse_tier() {
        let t = [20.0, 30.0, 40.0];
        assert_eq!(classify(19.999, t), Tier::Excellent);
        assert_eq!(classify(20.0, t), Tier::Good);
        assert_eq!(classify(30.0, t), Tier::Attention);
        assert_eq!(classify(40.0, t), Tier::Critical);
        assert_eq!(classify(f64::MAX, t), Tier::Critical);
        assert_eq!(classify(-5.0, t), Tier::Excellent);
    }

    #[test]
    fn overall_is_worst_available() {
        let b = classify_performance(15.0, Some(9.0), 1.0, 10.0);
        assert_eq!(b.details.ili, Some(Tier::Critical));
        assert_eq!(b.overall, Tier::Critical);

        let b = classify_performance(25.0, None, 1.0, 10.0);
        assert_eq!(b.details.ili, None);
        assert_eq!(b.overall, Tier::Good);
    }

    #[test]
    fn tiers_serialize_as_levels() {
        let b = classify_performance(35.0, None, 12.0, 250.0);
        let v = serde_json::to_value(&b).unwrap();
        assert_eq!(v["overall"], 3);
        assert_eq!(v["details"]["nrw"], 2);
        assert_eq!(v["details"]["ili"], serde_json::Value::Null);
        assert_eq!(v["details"]["m3PerKmPerDay"], 2);
        assert_eq!(v["details"]["lPerConnectionPerDay"], 3);
    }

    #[test]
    fn labels_follow_level_order() {
        let labels: Vec<_> = [Tier::Excellent, Tier::Good, Tier::Attention, Tier::Critical]
            .iter()
            .map(|t| t.label())
            .collect();
        assert_eq!(labels, ["Sangat Baik", "Baik", "Perlu Perhatian", "Kritis"]);
    }
}
