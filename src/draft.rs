//! Work-in-progress snapshot of a `CalculationContext`, saved as JSON so a
//! session can be resumed.

use crate::context::{CalculationContext, Mode};
use crate::error::Result;
use crate::types::{BalanceInput, Zone};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DRAFT_VERSION: &str = "1.2";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub mode: Mode,
    /// Utility-mode input; `None` in zone mode.
    #[serde(default)]
    pub data: Option<BalanceInput>,
    /// Zone-mode collection; `None` in utility mode.
    #[serde(default)]
    pub zones: Option<Vec<Zone>>,
}

impl Draft {
    /// Only the data belonging to the active mode is kept.
    pub fn capture(ctx: &CalculationContext) -> Self {
        let (data, zones) = match ctx.mode {
            Mode::Utility => (Some(ctx.utility.clone()), None),
            Mode::Zones => (None, Some(ctx.zones.clone())),
        };
        Draft {
            version: DRAFT_VERSION.to_string(),
            timestamp: Utc::now(),
            mode: ctx.mode,
            data,
            zones,
        }
    }

    pub fn restore(self) -> CalculationContext {
        let mut ctx = CalculationContext::new(self.mode);
        ctx.utility = self.data.unwrap_or_default();
        ctx.zones = self.zones.unwrap_or_default();
        ctx
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("draft saved to {}", path.display());
        Ok(())
    }

    /// `Ok(None)` when no draft has been saved yet.
    pub fn load(path: &Path) -> Result<Option<Draft>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }
}
