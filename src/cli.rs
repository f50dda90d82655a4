//! Command-line argument parsing for the `node-architect` binary.

use std::env;
use std::path::PathBuf;

/// Default port for `--serve`.
#[cfg(feature = "api")]
pub const DEFAULT_PORT: u16 = 3000;

/// What the binary should do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the component catalog.
    List,
    /// Evaluate one build file and print the report.
    Simulate { build: PathBuf },
    /// Evaluate build files and write a MissionProject document.
    Export {
        out: PathBuf,
        builds: Vec<PathBuf>,
        mission_name: Option<String>,
        legacy_v1: bool,
    },
    /// Import a MissionProject document and summarize its nodes.
    Import { project: PathBuf },
    /// Render a MissionProject document as GeoJSON and/or CoT events.
    Geo {
        project: PathBuf,
        geojson: Option<PathBuf>,
        cot: Option<PathBuf>,
    },
    /// No command; only meaningful with `--serve`.
    Serve,
    Help,
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub catalog: Option<PathBuf>,
    pub csv_out: Option<PathBuf>,
    /// Where to persist the design collection after `export` or `import`.
    pub save_designs: Option<PathBuf>,
    pub command: Command,
    #[cfg(feature = "api")]
    pub serve: bool,
    #[cfg(feature = "api")]
    pub port: u16,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

/// Parses arguments, excluding the program name.
///
/// # Errors
///
/// Returns a message describing the first problem found.
pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut config = None;
    let mut preset = None;
    let mut catalog = None;
    let mut csv_out = None;
    let mut save_designs = None;
    let mut positional: Vec<String> = Vec::new();
    let mut builds = Vec::new();
    let mut mission_name = None;
    let mut legacy_v1 = false;
    let mut geojson = None;
    let mut cot = None;
    #[cfg(feature = "api")]
    let mut serve = false;
    #[cfg(feature = "api")]
    let mut port = DEFAULT_PORT;

    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => return Ok(help()),
            "--config" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--catalog" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --catalog (expected a JSON file path)")?;
                catalog = Some(PathBuf::from(path));
            }
            "--csv-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --csv-out (expected a file path)")?;
                csv_out = Some(PathBuf::from(path));
            }
            "--save-designs" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --save-designs (expected a file path)")?;
                save_designs = Some(PathBuf::from(path));
            }
            "--build" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --build (expected a build JSON path)")?;
                builds.push(PathBuf::from(path));
            }
            "--mission-name" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --mission-name")?;
                mission_name = Some(name.to_string());
            }
            "--legacy-v1" => legacy_v1 = true,
            "--geojson" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --geojson (expected a file path)")?;
                geojson = Some(PathBuf::from(path));
            }
            "--cot" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --cot (expected a file path)")?;
                cot = Some(PathBuf::from(path));
            }
            #[cfg(feature = "api")]
            "--serve" => serve = true,
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                port = raw
                    .parse()
                    .map_err(|_| format!("--port value \"{raw}\" is not a valid u16"))?;
            }
            other if other.starts_with("--") => return Err(format!("unknown argument: {other}")),
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    if config.is_some() && preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source".to_string(),
        );
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        None => Command::Serve,
        Some("list") => Command::List,
        Some("simulate") => Command::Simulate {
            build: PathBuf::from(positional.next().ok_or("simulate requires a build file")?),
        },
        Some("export") => {
            let out = PathBuf::from(positional.next().ok_or("export requires an output path")?);
            if builds.is_empty() {
                return Err("export requires at least one --build <path>".to_string());
            }
            Command::Export {
                out,
                builds: std::mem::take(&mut builds),
                mission_name: mission_name.take(),
                legacy_v1,
            }
        }
        Some("import") => Command::Import {
            project: PathBuf::from(positional.next().ok_or("import requires a project file")?),
        },
        Some("geo") => Command::Geo {
            project: PathBuf::from(positional.next().ok_or("geo requires a project file")?),
            geojson: geojson.take(),
            cot: cot.take(),
        },
        Some(other) => return Err(format!("unknown command: {other}")),
    };
    if let Some(extra) = positional.next() {
        return Err(format!("unexpected argument: {extra}"));
    }
    if !builds.is_empty() || mission_name.is_some() {
        return Err("--build and --mission-name only apply to `export`".to_string());
    }

    #[cfg(feature = "api")]
    let serve_only_ok = serve;
    #[cfg(not(feature = "api"))]
    let serve_only_ok = false;
    if command == Command::Serve && !serve_only_ok {
        return Err("missing command (list, simulate, export, import, geo)".to_string());
    }

    Ok(CliOptions {
        config,
        preset,
        catalog,
        csv_out,
        save_designs,
        command,
        #[cfg(feature = "api")]
        serve,
        #[cfg(feature = "api")]
        port,
    })
}

fn help() -> CliOptions {
    CliOptions {
        config: None,
        preset: None,
        catalog: None,
        csv_out: None,
        save_designs: None,
        command: Command::Help,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: DEFAULT_PORT,
    }
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("node-architect: node power, range and role estimator");
    eprintln!();
    eprintln!("Usage: node-architect [OPTIONS] <COMMAND>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  list                         Print the component catalog");
    eprintln!("  simulate <build.json>        Evaluate one build and print the report");
    eprintln!("  export <out.json> --build <path>... [--mission-name <name>] [--legacy-v1]");
    eprintln!("                               Write a MissionProject document");
    eprintln!("  import <project.json>        Import a MissionProject and summarize it");
    eprintln!("  geo <project.json> [--geojson <out>] [--cot <out>]");
    eprintln!("                               Render nodes for map tools");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>              Load configuration from a TOML file");
    eprintln!("  --preset <name>              Use a built-in preset (baseline, whitefrost, urban)");
    eprintln!("  --catalog <path>             Component catalog JSON (overrides [catalog] path)");
    eprintln!("  --csv-out <path>             Write a CSV summary of the designs");
    eprintln!("  --save-designs <path>        Persist the design collection as JSON");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                      Start the REST API after the command");
        eprintln!("  --port <u16>                 API server port (default: 3000)");
    }
    eprintln!("  --help                       Show this help message");
}
