use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::combat::{estimate, parse_school_list, CursePolicy, MagicSchool, OutcomeCounts};
use crate::data::{FileLogSource, GearCatalog, SchoolCatalog, TargetSelector, ZoneCatalog};
use crate::error::Result;
use crate::scan::{ResultDocument, ScanConfig, Scanner};

const USAGE: &str = "usage: spellres <scan|show|zones|estimate>";
const SCAN_USAGE: &str = "usage: spellres scan (--zone N | --encounter N | --enemy N) [--schools a,b] \
[--cast-limit N] [--ignore-curses | --curse-only] [--workers N] [--schools-file F] [--verbose]";
const SHOW_USAGE: &str = "usage: spellres show <result.json> [--csv]";
const ESTIMATE_USAGE: &str = "usage: spellres estimate <miss> <r25> <r50> <r75> <full> \
[--school S] [--caster-level N] [--target-level N]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Scan,
    Show,
    Zones,
    Estimate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("scan") => Some(Command::Scan),
        Some("show") => Some(Command::Show),
        Some("zones") => Some(Command::Zones),
        Some("estimate") => Some(Command::Estimate),
        _ => None,
    }
}

/// Install the stderr log subscriber. `RUST_LOG` still refines the filter.
pub fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Scan) => handle_scan(args),
        Some(Command::Show) => handle_show(args),
        Some(Command::Zones) => handle_zones(args),
        Some(Command::Estimate) => handle_estimate(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn handle_scan(args: &[String]) -> i32 {
    let config = match scan_config_from_args(args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{SCAN_USAGE}");
            return 2;
        }
    };
    let Some(selector) = target_selector(args) else {
        eprintln!("{SCAN_USAGE}");
        return 2;
    };

    match run_scan(&config, selector) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("scan failed: {}", err.chain());
            1
        }
    }
}

fn scan_config_from_args(args: &[String]) -> std::result::Result<ScanConfig, String> {
    let mut config = ScanConfig::from_env();

    if let Some(raw) = flag_value(args, "--schools") {
        config.schools = parse_school_list(raw).map_err(|e| e.to_string())?;
        if config.schools.is_empty() {
            return Err("no schools selected".to_string());
        }
    }
    config.curse_policy = match (has_flag(args, "--ignore-curses"), has_flag(args, "--curse-only")) {
        (true, true) => return Err("--ignore-curses and --curse-only are exclusive".to_string()),
        (true, false) => CursePolicy::Exclude,
        (false, true) => CursePolicy::Require,
        (false, false) => CursePolicy::Discount,
    };
    config.spell_cast_limit = parse_arg(
        flag_value(args, "--cast-limit"),
        "cast-limit",
        config.spell_cast_limit,
    );
    config.workers = parse_arg(flag_value(args, "--workers"), "workers", config.workers);
    config.schools_file = flag_value(args, "--schools-file").map(PathBuf::from);
    Ok(config)
}

fn target_selector(args: &[String]) -> Option<TargetSelector> {
    let zone = flag_value(args, "--zone").map(|v| v.parse().map(TargetSelector::Zone));
    let encounter = flag_value(args, "--encounter").map(|v| v.parse().map(TargetSelector::Encounter));
    let enemy = flag_value(args, "--enemy").map(|v| v.parse().map(TargetSelector::Enemy));

    let mut chosen = [zone, encounter, enemy].into_iter().flatten();
    let selector = chosen.next()?.ok();
    if chosen.next().is_some() {
        return None;
    }
    selector
}

fn run_scan(config: &ScanConfig, selector: TargetSelector) -> Result<()> {
    let gear = GearCatalog::load(config.items_path())?;
    let zones = ZoneCatalog::load(config.zones_path())?;
    let schools = match &config.schools_file {
        Some(path) => SchoolCatalog::with_overrides(path)?,
        None => SchoolCatalog::default(),
    };
    let source = FileLogSource::open(&config.reports_dir)?;
    let selection = zones.select(selector)?;
    tracing::info!(
        zone = %selection.zone_name,
        targets = selection.targets.len(),
        schools = ?config.schools,
        "starting scan"
    );

    let scanner = Scanner::new(&source, &gear, &schools, config);
    for target in &selection.targets {
        let outcome = scanner.scan_with(target, |table| {
            ResultDocument::build(&target.enemy, table, config.levels)
                .write(&config.results_dir)
                .map(|_| ())
        })?;

        let document = ResultDocument::build(&target.enemy, &outcome.table, config.levels);
        print!("{}", document.render_text());
        if outcome.reports_used == 0 {
            tracing::info!(enemy = %target.enemy.name, "no report contributed; result not written");
        } else {
            println!("written: {}", config.result_path(target.enemy.id).display());
        }
    }
    Ok(())
}

fn handle_show(args: &[String]) -> i32 {
    let Some(path) = args.get(2).filter(|arg| !arg.starts_with("--")) else {
        eprintln!("{SHOW_USAGE}");
        return 2;
    };

    let document = match ResultDocument::load(path) {
        Ok(document) => document,
        Err(err) => {
            eprintln!("show failed: {}", err.chain());
            return 1;
        }
    };

    if has_flag(args, "--csv") {
        if let Err(err) = document.write_csv(io::stdout().lock()) {
            eprintln!("show failed: {}", err.chain());
            return 1;
        }
    } else {
        print!("{}", document.render_text());
    }
    0
}

fn handle_zones(args: &[String]) -> i32 {
    let zone_id = match args
        .get(2)
        .filter(|arg| !arg.starts_with("--"))
        .map(|raw| raw.parse::<u32>())
    {
        None => None,
        Some(Ok(id)) => Some(id),
        Some(Err(_)) => {
            eprintln!("usage: spellres zones [zoneID]");
            return 2;
        }
    };

    let config = ScanConfig::from_env();
    let listing = ZoneCatalog::load(config.zones_path()).and_then(|zones| zones.describe(zone_id));
    match listing {
        Ok(text) => {
            print!("{text}");
            0
        }
        Err(err) => {
            eprintln!("zones failed: {}", err.chain());
            1
        }
    }
}

fn handle_estimate(args: &[String]) -> i32 {
    let counts: Vec<u64> = args
        .iter()
        .skip(2)
        .take(5)
        .map_while(|raw| raw.parse().ok())
        .collect();
    let [miss, resist25, resist50, resist75, full_hit] = counts[..] else {
        eprintln!("{ESTIMATE_USAGE}");
        return 2;
    };

    let school = match flag_value(args, "--school").map(MagicSchool::from_str) {
        None => MagicSchool::Fire,
        Some(Ok(school)) => school,
        Some(Err(err)) => {
            eprintln!("{err}");
            eprintln!("{ESTIMATE_USAGE}");
            return 2;
        }
    };
    let defaults = ScanConfig::default().levels;
    let caster_level = parse_arg(flag_value(args, "--caster-level"), "caster-level", defaults.caster_level);
    let target_level = parse_arg(flag_value(args, "--target-level"), "target-level", defaults.target_level);

    let counts = OutcomeCounts {
        miss,
        resist25,
        resist50,
        resist75,
        full_hit,
    };
    let result = estimate(&counts, caster_level, target_level, school.has_level_scaling());
    println!("school: {school}");
    println!("casts: {}", counts.casts());
    match result.partial_percent() {
        Some(partial) => println!("partial: {partial}%"),
        None => println!("partial: {result}"),
    }
    println!("resistance: {result}");
    0
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_arg<T>(raw: Option<&str>, name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
{
    raw.and_then(|value| value.parse::<T>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}
