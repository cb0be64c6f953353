//! Caller-owned calculation state: the mode, the utility-level input and the
//! DMA zone collection. Evaluation is a pure function of this struct.

use crate::calculator::calculate;
use crate::error::{Error, Result};
use crate::types::{BalanceInput, BalanceResult, Zone};
use crate::validator::{validate, ValidationReport};
use crate::zones::{
    aggregate_zones, identify_priority_zones, validate_zone, PriorityEntry, ZoneAnalysis, ZoneError,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Whole utility as one entity.
    #[default]
    #[serde(rename = "pdam")]
    Utility,
    /// Zone-by-zone District Metered Areas.
    #[serde(rename = "dma")]
    Zones,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculationContext {
    pub mode: Mode,
    pub utility: BalanceInput,
    pub zones: Vec<Zone>,
    /// Last sequence number handed to `add_zone`; never reused.
    next_zone_seq: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Structural errors; nothing was calculated.
    Rejected(ValidationReport),
    Utility {
        report: ValidationReport,
        result: BalanceResult,
    },
    Zones {
        analysis: ZoneAnalysis,
        priorities: Vec<PriorityEntry>,
        /// Zones failing the record check, by id. They are still analysed.
        zone_issues: Vec<(String, Vec<ZoneError>)>,
    },
}

impl CalculationContext {
    pub fn new(mode: Mode) -> Self {
        CalculationContext {
            mode,
            ..Default::default()
        }
    }

    /// Validate-then-calculate for utility mode; analyse and prioritise for
    /// zone mode.
    pub fn evaluate(&self) -> Result<Evaluation> {
        match self.mode {
            Mode::Utility => {
                let report = validate(&self.utility);
                if !report.is_valid {
                    return Ok(Evaluation::Rejected(report));
                }
                Ok(Evaluation::Utility {
                    result: calculate(&self.utility),
                    report,
                })
            }
            Mode::Zones => {
                if self.zones.is_empty() {
                    return Err(Error::NoZones);
                }
                let zone_issues = self
                    .zones
                    .iter()
                    .filter_map(|z| validate_zone(z).err().map(|e| (z.id.clone(), e)))
                    .collect();
                let analysis = aggregate_zones(&self.zones);
                let priorities = identify_priority_zones(&analysis.ranked_zones);
                Ok(Evaluation::Zones {
                    analysis,
                    priorities,
                    zone_issues,
                })
            }
        }
    }

    /// Append an empty zone; `name` defaults to `Zona N`.
    pub fn add_zone(&mut self, name: Option<&str>) -> &Zone {
        let name = match name.map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => format!("Zona {}", self.zones.len() + 1),
        };
        let id = self.next_zone_id();
        self.zones.push(Zone {
            id,
            name,
            data: BalanceInput::default(),
        });
        &self.zones[self.zones.len() - 1]
    }

    // Restored or imported zones may already hold ids from this sequence.
    fn next_zone_id(&mut self) -> String {
        let millis = Utc::now().timestamp_millis();
        loop {
            self.next_zone_seq += 1;
            let id = format!("zone-{}-{}", millis, self.next_zone_seq);
            if !self.zones.iter().any(|z| z.id == id) {
                return id;
            }
        }
    }

    pub fn update_zone(&mut self, id: &str, data: BalanceInput) -> Result<()> {
        let zone = self
            .zones
            .iter_mut()
            .find(|z| z.id == id)
            .ok_or_else(|| Error::ZoneNotFound(id.to_string()))?;
        zone.data = data;
        Ok(())
    }

    pub fn remove_zone(&mut self, id: &str) -> Result<Zone> {
        let index = self
            .zones
            .iter()
            .position(|z| z.id == id)
            .ok_or_else(|| Error::ZoneNotFound(id.to_string()))?;
        Ok(self.zones.remove(index))
    }

    pub fn clear_zones(&mut self) {
        self.zones.clear();
    }

    /// Replace the zone collection (e.g. after a CSV import) and switch to
    /// zone mode.
    pub fn replace_zones(&mut self, zones: Vec<Zone>) {
        self.zones = zones;
        self.mode = Mode::Zones;
    }
}
