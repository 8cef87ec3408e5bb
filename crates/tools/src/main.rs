use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use engine::{EngineConfig, Position, compute_initial_view, normalize};
use tools::{build_plan, parse_entities};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    match cmd.as_str() {
        "normalize" => cmd_normalize(args),
        "view" => cmd_view(args),
        "plan" => cmd_plan(args),
        _ => Err(usage()),
    }
}

fn cmd_normalize(args: Vec<String>) -> Result<(), String> {
    // tourmap normalize <lon> <lat>
    let [lon, lat] = args.as_slice() else {
        return Err(usage());
    };
    let p = normalize(lon, lat).map_err(|e| e.to_string())?;
    print_json(&p)
}

fn cmd_view(args: Vec<String>) -> Result<(), String> {
    // tourmap view <entities.json>
    let [path] = args.as_slice() else {
        return Err(usage());
    };
    let entities = read_entities(Path::new(path))?;
    let positions: Vec<Position> = entities
        .iter()
        .filter_map(|e| e.position().ok())
        .collect();
    print_json(&compute_initial_view(&positions))
}

fn cmd_plan(args: Vec<String>) -> Result<(), String> {
    // tourmap plan <entities.json> [--config FILE] [--api-key KEY] [--highlight ID]
    let mut input: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut api_key: Option<String> = None;
    let mut highlight: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            flag @ ("--config" | "--api-key" | "--highlight") => {
                i += 1;
                let value = args
                    .get(i)
                    .cloned()
                    .ok_or_else(|| format!("{flag} requires a value"))?;
                match flag {
                    "--config" => config_path = Some(PathBuf::from(value)),
                    "--api-key" => api_key = Some(value),
                    _ => highlight = Some(value),
                }
            }
            s if s.starts_with('-') => {
                return Err(format!("unknown arg: {s}\n\n{}", usage()));
            }
            s => {
                if input.is_some() {
                    return Err(format!("unexpected arg: {s}\n\n{}", usage()));
                }
                input = Some(PathBuf::from(s));
            }
        }
        i += 1;
    }

    let input = input.ok_or_else(usage)?;
    let mut config = match config_path {
        Some(p) => EngineConfig::from_file(&p).map_err(|e| e.to_string())?,
        None => EngineConfig::default(),
    }
    .with_env(|k| env::var(k).ok());
    if let Some(key) = api_key {
        config = config.with_api_key(key);
    }

    let entities = read_entities(&input)?;
    let plan = build_plan(entities, config, highlight.as_deref())?;
    print_json(&plan)
}

fn read_entities(path: &Path) -> Result<Vec<engine::Entity>, String> {
    let raw = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    parse_entities(&raw)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let payload = serde_json::to_string_pretty(value).map_err(|e| format!("json: {e}"))?;
    println!("{payload}");
    Ok(())
}

fn usage() -> String {
    let exe = env::args().next().unwrap_or_else(|| "tourmap".to_string());
    format!(
        "Usage:\n  {exe} normalize <lon> <lat>\n  {exe} view <entities.json>\n  {exe} plan <entities.json> [--config FILE] [--api-key KEY] [--highlight ID]\n\nNotes:\n- Entity files are a JSON array of entities or a Korea Tour API response.\n- Coordinates may be decimal degrees or legacy fixed-point integers (1e-7 degrees).\n- The API key is read from --api-key, then KAKAO_MAP_APP_KEY, then the config file.\n"
    )
}
