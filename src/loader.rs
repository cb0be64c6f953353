//! Zone import from delimited text.
//!
//! Expected columns: Name, SIV, Billed, [Customers], [PipeLengthKm]. An
//! optional header row is detected from the first line.

use crate::error::Result;
use crate::types::{BalanceInput, FieldValue, Zone};
use crate::util::parse_f64_safe;
use chrono::Utc;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, warn};
use serde::Serialize;
use std::path::Path;

/// Loss-estimation defaults applied to imported zones.
pub const DEFAULT_PRESSURE_BAR: f64 = 2.5;
pub const DEFAULT_UNAUTHORIZED_PCT: f64 = 3.0;
pub const DEFAULT_METER_INACCURACY_PCT: f64 = 2.0;

const HEADER_MARKERS: [&str; 4] = ["nama", "name", "zone", "dma"];

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub success: bool,
    pub zones: Vec<Zone>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

fn is_header(first_line: &str) -> bool {
    let lower = first_line.to_lowercase();
    HEADER_MARKERS.iter().any(|m| lower.contains(m))
}

fn zone_input(siv: f64, billed: f64, customers: f64, pipe_length_km: f64) -> BalanceInput {
    BalanceInput {
        system_input_volume: Some(FieldValue::Number(siv)),
        billed_metered: Some(FieldValue::Number(billed)),
        number_of_customers: Some(FieldValue::Number(customers)),
        pipe_length_km: Some(FieldValue::Number(pipe_length_km)),
        average_pressure: Some(FieldValue::Number(DEFAULT_PRESSURE_BAR)),
        unbilled_metered: Some(FieldValue::Number(0.0)),
        unbilled_unmetered: Some(FieldValue::Number(0.0)),
        unauthorized_pct: Some(FieldValue::Number(DEFAULT_UNAUTHORIZED_PCT)),
        meter_inaccuracy_pct: Some(FieldValue::Number(DEFAULT_METER_INACCURACY_PCT)),
        ..Default::default()
    }
}

enum RowOutcome {
    /// Accepted zone, with a warning when billed exceeds SIV.
    Zone(Zone, Option<String>),
    Skipped(String),
}

/// Split one line into trimmed fields, honouring quotes and `""` escapes.
fn split_line(line: &str) -> csv::Result<StringRecord> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(line.as_bytes());
    let mut record = StringRecord::new();
    rdr.read_record(&mut record)?;
    Ok(record)
}

fn parse_row(record: &StringRecord, line: usize, processed: usize, stamp: i64) -> RowOutcome {
    if record.len() < 3 {
        return RowOutcome::Skipped(format!(
            "Baris {}: Kolom tidak lengkap (min: Nama, SIV, Terjual)",
            line
        ));
    }

    let (Some(siv), Some(billed)) = (parse_f64_safe(record.get(1)), parse_f64_safe(record.get(2)))
    else {
        return RowOutcome::Skipped(format!(
            "Baris {}: SIV atau Volume Terjual bukan angka valid",
            line
        ));
    };
    if siv <= 0.0 || billed <= 0.0 {
        return RowOutcome::Skipped(format!("Baris {}: SIV dan Volume Terjual harus > 0", line));
    }

    let name = match record.get(0).unwrap_or("") {
        "" => format!("DMA-{:02}", processed + 1),
        n => n.to_string(),
    };
    let customers = parse_f64_safe(record.get(3)).unwrap_or(0.0);
    let pipe_length_km = parse_f64_safe(record.get(4)).unwrap_or(0.0);

    let suspicious = (billed > siv).then(|| {
        format!(
            "Baris {}: Volume Terjual ({}) > SIV ({}) - Data mencurigakan",
            line, billed, siv
        )
    });
    let zone = Zone {
        id: format!("zone-import-{}-{}", stamp, processed),
        name,
        data: zone_input(siv, billed, customers, pipe_length_km),
    };
    RowOutcome::Zone(zone, suspicious)
}

/// Parse CSV text into zones, collecting per-row diagnostics instead of
/// failing.
pub fn import_zones_from_csv(text: &str) -> ImportReport {
    let mut report = ImportReport::default();

    if text.trim().is_empty() {
        report.errors.push("File CSV kosong".to_string());
        return report;
    }

    let skip_header = is_header(text.lines().next().unwrap_or(""));
    if skip_header {
        report.warnings.push("Header terdeteksi dan dilewati".to_string());
    }

    let stamp = Utc::now().timestamp_millis();
    let mut processed = 0usize;
    let mut skipped = 0usize;

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        if skip_header && index == 0 {
            continue;
        }
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        let record = match split_line(trimmed) {
            Ok(r) => r,
            Err(e) => {
                report.warnings.push(format!("Baris {}: Error parsing - {}", line, e));
                skipped += 1;
                continue;
            }
        };

        match parse_row(&record, line, processed, stamp) {
            RowOutcome::Zone(zone, suspicious) => {
                report.warnings.extend(suspicious);
                report.zones.push(zone);
                processed += 1;
            }
            RowOutcome::Skipped(message) => {
                warn!("{}", message);
                report.warnings.push(message);
                skipped += 1;
            }
        }
    }

    if processed > 0 {
        report.success = true;
    } else {
        report
            .errors
            .push("Tidak ada data valid yang bisa diimport".to_string());
    }
    if skipped > 0 {
        report.warnings.push(format!(
            "Total {} baris dilewati karena data tidak valid",
            skipped
        ));
    }

    debug!("imported {} zones, skipped {} rows", processed, skipped);
    report
}

pub fn load_zones_csv(path: &Path) -> Result<ImportReport> {
    let text = std::fs::read_to_string(path)?;
    Ok(import_zones_from_csv(&text))
}

/// Example file users can start from.
pub fn csv_template() -> &'static str {
    "Nama Zona,SIV (m³/thn),Terjual (m³/thn),Jumlah Pelanggan,Panjang Pipa (km)\n\
     DMA-01 Melati,600000,420000,1200,15.5\n\
     DMA-02 Mawar,900000,576000,1800,22.3\n\
     DMA-03 Anggrek,504000,336000,950,12.8\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn siv_of(zone: &Zone) -> Option<f64> {
        zone.data.system_input_volume.as_ref().and_then(FieldValue::as_f64)
    }

    #[test]
    fn imports_rows_and_skips_header() {
        let report = import_zones_from_csv(indoc! {"
            Nama Zona,SIV,Terjual,Pelanggan,Pipa
            DMA-01 Melati,50000,35000,1200,15.5
            DMA-02 Mawar,75000,48000,1800,22.3
        "});
        assert!(report.success);
        assert_eq!(report.zones.len(), 2);
        assert_eq!(report.warnings, vec!["Header terdeteksi dan dilewati".to_string()]);
        let z = &report.zones[0];
        assert_eq!(z.name, "DMA-01 Melati");
        assert!(z.id.starts_with("zone-import-"));
        let p = z.data.parse();
        assert_eq!(p.siv, 50_000.0);
        assert_eq!(p.billed_metered, 35_000.0);
        assert_eq!(p.customers, 1200);
        assert_eq!(p.pipe_length_km, 15.5);
        assert_eq!(p.average_pressure, 2.5);
        assert_eq!(p.unauthorized_pct, 3.0);
        assert_eq!(p.meter_inaccuracy_pct, 2.0);
    }

    #[test]
    fn quoted_fields_keep_commas() {
        let report = import_zones_from_csv("\"Zona \"\"Timur\"\", Blok A\",1000,800\n");
        assert_eq!(report.zones.len(), 1);
        assert_eq!(report.zones[0].name, "Zona \"Timur\", Blok A");
        assert_eq!(siv_of(&report.zones[0]), Some(1000.0));
    }

    #[test]
    fn quotes_inside_a_bare_field_are_literal() {
        let report = import_zones_from_csv("Zona \"Timur\",1000,800\n");
        assert_eq!(report.zones[0].name, "Zona \"Timur\"");
        assert_eq!(siv_of(&report.zones[0]), Some(1000.0));
    }

    #[test]
    fn numeric_cells_with_units_keep_their_leading_number() {
        let report = import_zones_from_csv("A,1000 m3,800 m3,120 SR,4.5km\n");
        let p = report.zones[0].data.parse();
        assert_eq!(p.siv, 1000.0);
        assert_eq!(p.billed_metered, 800.0);
        assert_eq!(p.customers, 120);
        assert_eq!(p.pipe_length_km, 4.5);
    }

    #[test]
    fn bad_rows_are_skipped_with_warnings() {
        let report = import_zones_from_csv(indoc! {"
            A,1000,800
            B,1000
            C,abc,800
            D,0,800

            E,1000,1200
        "});
        let names: Vec<_> = report.zones.iter().map(|z| z.name.as_str()).collect();
        assert_eq!(names, ["A", "E"]);
        assert_eq!(
            report.warnings,
            vec![
                "Baris 2: Kolom tidak lengkap (min: Nama, SIV, Terjual)".to_string(),
                "Baris 3: SIV atau Volume Terjual bukan angka valid".to_string(),
                "Baris 4: SIV dan Volume Terjual harus > 0".to_string(),
                "Baris 6: Volume Terjual (1200) > SIV (1000) - Data mencurigakan".to_string(),
                "Total 3 baris dilewati karena data tidak valid".to_string(),
            ]
        );
        assert!(report.success);
    }

    #[test]
    fn empty_name_gets_generated_label() {
        let report = import_zones_from_csv("X,100,50\n,200,100\n");
        assert_eq!(report.zones[1].name, "DMA-02");
    }

    #[test]
    fn empty_text_is_an_error() {
        let report = import_zones_from_csv("   \n");
        assert!(!report.success);
        assert_eq!(report.errors, vec!["File CSV kosong".to_string()]);
    }

    #[test]
    fn nothing_valid_is_an_error() {
        let report = import_zones_from_csv("dma,siv,billed\nA,x,y\n");
        assert!(!report.success);
        assert!(report.zones.is_empty());
        assert_eq!(report.errors, vec!["Tidak ada data valid yang bisa diimport".to_string()]);
    }

    #[test]
    fn template_round_trips_through_importer() {
        let report = import_zones_from_csv(csv_template());
        assert!(report.success);
        assert_eq!(report.zones.len(), 3);
        assert_eq!(report.warnings.len(), 1);
    }
}
