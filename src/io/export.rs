//! CSV summary export for saved designs.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::design::NodeDesign;
use crate::estimate::Constraints;

/// Column header for the design summary.
const HEADER: &str = "id,name,recommended_role,weight_kg,draw_w,adjusted_runtime_h,\
                      capacity_factor,rf_bands,capabilities,passes";

/// Exports a design summary to a CSV file at the given path.
///
/// Writes a header row followed by one row per design, in collection order.
/// `passes` reflects the given constraints. Produces deterministic output for
/// identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(designs: &[NodeDesign], constraints: &Constraints, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(designs, constraints, buf)
}

/// Writes a design summary as CSV to any writer.
///
/// List columns (`rf_bands`, `capabilities`) are joined with `;`.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(designs: &[NodeDesign], constraints: &Constraints, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for d in designs {
        let caps: Vec<&str> = d.capabilities.iter().map(String::as_str).collect();
        wtr.write_record(&[
            d.id.clone(),
            d.name.clone(),
            d.recommended_role.clone(),
            format!("{:.3}", d.weight_kg),
            format!("{:.2}", d.runtime.total_power_w),
            format!("{:.2}", d.runtime.adjusted_runtime_hours),
            format!("{:.2}", d.runtime.capacity_factor),
            d.rf_bands.join(";"),
            caps.join(";"),
            d.check(constraints, false).passes.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::catalog::{Antenna, Battery, Compute, Radio};
    use crate::estimate::{EnvironmentProfile, FactorTables, NodeConfig, RfChain, evaluate};

    fn design(n: usize) -> NodeDesign {
        let config = NodeConfig {
            compute: Compute {
                id: "pi5".into(),
                power_w_idle: Some(4.5),
                power_w_load: Some(11.0),
                weight_kg: Some(0.2),
                ..Compute::default()
            },
            battery: Battery {
                id: "pack".into(),
                capacity_wh: Some(144.0),
                weight_kg: Some(1.0),
                ..Battery::default()
            },
            chains: vec![RfChain {
                radio: Radio {
                    id: "alfa".into(),
                    radio_type: "wifi".into(),
                    bands: vec!["2.4GHz".into(), "5GHz".into()],
                    power_w_tx: Some(2.0),
                    power_w_rx: Some(1.5),
                    supports_monitor: true,
                    ..Radio::default()
                },
                antenna: Antenna {
                    id: "panel".into(),
                    gain_dbi: Some(14.0),
                    ..Antenna::default()
                },
            }],
            sensors: Vec::new(),
            environment: EnvironmentProfile::default(),
            location: None,
        };
        let result = evaluate(&config, &FactorTables::default()).expect("evaluates");
        NodeDesign::from_evaluation(
            format!("node-{n}"),
            format!("Node, {n}"),
            &config,
            &result,
            BTreeSet::new(),
        )
    }

    #[test]
    fn header_matches_columns() {
        let mut buf = Vec::new();
        write_csv(&[design(0)], &Constraints::default(), &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let first_line = output.as_deref().unwrap_or("").lines().next().unwrap_or("");
        assert_eq!(
            first_line,
            "id,name,recommended_role,weight_kg,draw_w,adjusted_runtime_h,\
             capacity_factor,rf_bands,capabilities,passes"
        );
    }

    #[test]
    fn row_count_matches_design_count() {
        let designs: Vec<NodeDesign> = (0..4).map(design).collect();
        let mut buf = Vec::new();
        write_csv(&designs, &Constraints::default(), &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        assert_eq!(output.as_deref().unwrap_or("").lines().count(), 5);
    }

    #[test]
    fn deterministic_output() {
        let designs: Vec<NodeDesign> = (0..3).map(design).collect();
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_csv(&designs, &Constraints::default(), &mut buf1).ok();
        write_csv(&designs, &Constraints::default(), &mut buf2).ok();
        assert_eq!(buf1, buf2);
    }

    #[test]
    fn rows_parse_back() {
        let constraints = Constraints {
            max_weight_kg: Some(1.0),
            ..Constraints::default()
        };
        let mut buf = Vec::new();
        write_csv(&[design(7)], &constraints, &mut buf).ok();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let records: Vec<csv::StringRecord> = rdr.records().filter_map(Result::ok).collect();
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(&rec[1], "Node, 7");
        assert_eq!(&rec[4], "9.50");
        assert_eq!(&rec[5], "15.16");
        assert_eq!(&rec[7], "2.4ghz;5ghz");
        assert_eq!(&rec[8], "WiFi recon / monitor mode scanning");
        assert_eq!(&rec[9], "false");
    }
}
