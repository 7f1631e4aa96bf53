//! report-runner: headless report runner for the collection analytics engine.
//!
//! Usage:
//!   report-runner --db coleta.db --report weekly-curve --cooperative 1
//!   report-runner --demo --seed 7 --report flat-file --cooperative 1 --out coop.txt
//!   report-runner --report daily-curve --condominium 101 --from 2024-05-01

mod demo;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use coleta_core::{
    clock::{Clock, SystemClock},
    config::ReportConfig,
    reporting::{ReportKind, ReportOutput, ReportRequest, ReportingService},
    store::SqliteStore,
    types::Subject,
};
use std::env;
use std::io::{self, Write};
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let demo_days = parse_arg(&args, "--demo-days", 400i64);
    let demo = args.iter().any(|a| a == "--demo");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");
    let out = string_arg(&args, "--out");

    let Some(report) = string_arg(&args, "--report") else {
        eprintln!("missing --report <name>; one of:");
        for kind in ReportKind::ALL {
            eprintln!("  {kind}");
        }
        bail!("no report requested");
    };
    let kind: ReportKind = report.parse()?;

    let subject = match (
        string_arg(&args, "--cooperative"),
        string_arg(&args, "--condominium"),
    ) {
        (Some(id), None) => Some(Subject::Cooperative(id.parse()?)),
        (None, Some(id)) => Some(Subject::Condominium(id.parse()?)),
        (None, None) => None,
        (Some(_), Some(_)) => bail!("pass either --cooperative or --condominium, not both"),
    };
    let from = string_arg(&args, "--from")
        .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d"))
        .transpose()?;

    let config = if Path::new(data_dir).join("reporting.json").exists() {
        ReportConfig::load(data_dir)?
    } else {
        log::warn!("No reporting.json under {data_dir}; using built-in defaults");
        ReportConfig::default()
    };

    let store = SqliteStore::open(db)?;
    store.migrate()?;

    let clock = SystemClock;
    if demo {
        let summary = demo::seed_demo(&store, seed, clock.now(), demo_days)?;
        log::info!(
            "Seeded demo data (seed {seed}): {} cooperatives, {} pickups, {} collections",
            summary.cooperatives, summary.pickups, summary.collections
        );
    }

    let reports = ReportingService::new(&store, clock, config)?;
    let request = ReportRequest { kind, subject, from };

    match reports.run(&request)? {
        ReportOutput::Structured(value) => {
            let json = serde_json::to_string_pretty(&value)?;
            write_output(out, json.as_bytes())?;
        }
        ReportOutput::File(export) => {
            log::info!("{} ({}, {} bytes)", export.file_name, export.content_type, export.bytes.len());
            write_output(out, &export.bytes)?;
        }
    }
    Ok(())
}

fn write_output(out: Option<&str>, bytes: &[u8]) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, bytes)?,
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
