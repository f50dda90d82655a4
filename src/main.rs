//! node-architect entry point: CLI wiring and config-driven workspace construction.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::process;

use chrono::Utc;

use node_architect::catalog::Catalog;
use node_architect::cli::{self, CliOptions, Command};
use node_architect::config::ArchitectConfig;
use node_architect::estimate::BuildSelection;
use node_architect::io::export::export_csv;
use node_architect::logging::init_logging;
use node_architect::mission::{Mission, SchemaVersion, parse_document, to_cot_events, to_geojson};
use node_architect::workspace::Workspace;

fn load_config(opts: &CliOptions) -> Result<ArchitectConfig, String> {
    let config = if let Some(path) = &opts.config {
        ArchitectConfig::from_toml_file(path).map_err(|e| e.to_string())?
    } else if let Some(name) = &opts.preset {
        ArchitectConfig::from_preset(name).map_err(|e| e.to_string())?
    } else {
        ArchitectConfig::baseline()
    };

    let errors = config.validate();
    if !errors.is_empty() {
        let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(lines.join("\n"));
    }
    Ok(config)
}

fn load_catalog(opts: &CliOptions, config: &ArchitectConfig) -> Result<Catalog, String> {
    let path = opts
        .catalog
        .as_ref()
        .or(config.catalog.path.as_ref())
        .ok_or("no catalog: pass --catalog <path> or set [catalog] path")?;
    Catalog::from_path(path).map_err(|e| e.to_string())
}

fn read_json(path: &Path) -> Result<serde_json::Value, String> {
    let raw = fs::read_to_string(path).map_err(|e| format!("cannot read \"{}\": {e}", path.display()))?;
    parse_document(&raw).map_err(|e| format!("{}: {e}", path.display()))
}

fn write_json(path: &Path, value: &impl serde::Serialize) -> Result<(), String> {
    let body = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    fs::write(path, body).map_err(|e| format!("cannot write \"{}\": {e}", path.display()))
}

fn list(catalog: &Catalog) {
    println!("COMPUTE");
    for c in &catalog.compute {
        println!(
            "- {}: {} (cpu score {}, {:.1}-{:.1} W)",
            c.id,
            c.name,
            c.cpu_score(),
            c.power_w_idle.unwrap_or(0.0),
            c.power_w_load.unwrap_or(0.0)
        );
    }
    println!("\nRADIOS");
    for r in &catalog.radios {
        println!("- {}: {} ({}, {})", r.id, r.name, r.radio_type, r.rf_bands().join("/"));
    }
    println!("\nANTENNAS");
    for a in &catalog.antennas {
        println!(
            "- {}: {} ({} dBi, {})",
            a.id,
            a.name,
            a.gain_dbi.unwrap_or(0.0),
            a.pattern.as_deref().unwrap_or("unknown pattern")
        );
    }
    println!("\nBATTERIES");
    for b in &catalog.batteries {
        println!(
            "- {}: {} ({} Wh, {})",
            b.id,
            b.name,
            b.capacity_wh(),
            b.chemistry.as_deref().unwrap_or("unknown chemistry")
        );
    }
    println!("\nSENSORS");
    for s in &catalog.sensors {
        println!("- {}: {} ({})", s.id, s.name, s.sensor_type);
    }
}

/// Node name for a build file: its stem with underscores as spaces.
fn build_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().replace('_', " "))
        .unwrap_or_default()
}

fn evaluate_build(workspace: &mut Workspace, path: &Path) -> Result<(), String> {
    let selection = BuildSelection::from_path(path)?;
    let report = workspace.evaluate(&selection).map_err(|e| format!("{}: {e}", path.display()))?;
    println!("{}", report.result);
    Ok(())
}

fn run(opts: &CliOptions) -> Result<Option<Workspace>, String> {
    let config = load_config(opts)?;
    init_logging(&config.logging);

    if let Command::Geo { project, geojson, cot } = &opts.command {
        let doc = read_json(project)?;
        let features = to_geojson(&doc);
        let events = to_cot_events(&doc);
        if let Some(path) = geojson {
            write_json(path, &features)?;
            eprintln!("GeoJSON written to {}", path.display());
        }
        if let Some(path) = cot {
            write_json(path, &events)?;
            eprintln!("CoT events written to {}", path.display());
        }
        if geojson.is_none() && cot.is_none() {
            let body = serde_json::to_string_pretty(&features).map_err(|e| e.to_string())?;
            println!("{body}");
        }
        return Ok(None);
    }

    let catalog = load_catalog(opts, &config)?;
    let mut workspace = Workspace::from_config(&config, catalog);

    match &opts.command {
        Command::List => list(workspace.catalog()),
        Command::Simulate { build } => evaluate_build(&mut workspace, build)?,
        Command::Export {
            out,
            builds,
            mission_name,
            legacy_v1,
        } => {
            if let Some(name) = mission_name {
                let mut mission: Mission = workspace.mission().clone();
                mission.name = name.clone();
                workspace.set_mission(mission);
            }
            for build in builds {
                evaluate_build(&mut workspace, build)?;
                workspace
                    .save_design(&build_name(build), "", BTreeSet::new())
                    .map_err(|e| e.to_string())?;
            }
            let schema = if *legacy_v1 {
                SchemaVersion::LegacyV1
            } else {
                SchemaVersion::V2
            };
            let project = workspace.export_project(Utc::now(), schema);
            write_json(out, &project)?;
            eprintln!("MissionProject written to {}", out.display());
        }
        Command::Import { project } => {
            let doc = read_json(project)?;
            let warnings = workspace.import_project(&doc).map_err(|e| e.to_string())?;
            println!(
                "Imported {} node(s) for mission \"{}\"",
                workspace.designs().len(),
                workspace.mission().name
            );
            for status in workspace.designs_with_status() {
                let d = status.design;
                println!(
                    "- {}: {} | {} | {:.2} h | {}",
                    d.id,
                    d.name,
                    d.recommended_role,
                    d.runtime.adjusted_runtime_hours,
                    if status.passes { "ok" } else { "fails constraints" }
                );
            }
            for warning in &warnings {
                eprintln!("warning: {warning}");
            }
        }
        Command::Geo { .. } | Command::Serve | Command::Help => {}
    }

    if let Some(path) = &opts.csv_out {
        export_csv(workspace.designs(), workspace.constraints(), path)
            .map_err(|e| format!("failed to write CSV: {e}"))?;
        eprintln!("Design summary written to {}", path.display());
    }
    if let Some(path) = &opts.save_designs {
        workspace.save_designs(path).map_err(|e| e.to_string())?;
        eprintln!("Designs saved to {}", path.display());
    }

    Ok(Some(workspace))
}

fn main() {
    let opts = match cli::parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(2);
        }
    };
    if opts.command == Command::Help {
        cli::print_usage();
        return;
    }

    #[cfg_attr(not(feature = "api"), expect(unused_variables))]
    let workspace = match run(&opts) {
        Ok(workspace) => workspace,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    #[cfg(feature = "api")]
    if opts.serve {
        use std::net::SocketAddr;
        use std::sync::{Arc, Mutex};

        let workspace = match workspace {
            Some(workspace) => workspace,
            None => {
                eprintln!("error: --serve needs a catalog-backed command");
                process::exit(1);
            }
        };
        let state = Arc::new(Mutex::new(workspace));
        let addr = SocketAddr::from(([0, 0, 0, 0], opts.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        if let Err(e) = rt.block_on(node_architect::api::serve(state, addr)) {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
