//! System resource sampling from procfs.
//!
//! CPU usage is approximated as the one-minute load average divided by
//! the core count, clamped to 1.0. Memory comes from `MemTotal` and
//! `MemAvailable`. On platforms without `/proc` (or when parsing
//! fails) sampling returns `None`, which the scaling decision treats
//! as no resource pressure.

use std::fs;

use causagrid_state::ResourceReadings;

/// Sample current cpu and memory usage. `None` when unavailable.
pub fn sample() -> Option<ResourceReadings> {
    let cpu_usage = sample_cpu()?;
    let (total_kb, available_kb) = sample_memory()?;
    if total_kb == 0 {
        return None;
    }
    let used_kb = total_kb.saturating_sub(available_kb);
    Some(ResourceReadings {
        cpu_usage,
        memory_usage: used_kb as f64 / total_kb as f64,
        free_memory_mb: available_kb / 1024,
        total_memory_mb: total_kb / 1024,
    })
}

fn sample_cpu() -> Option<f64> {
    let loadavg = fs::read_to_string("/proc/loadavg").ok()?;
    let load1: f64 = loadavg.split_whitespace().next()?.parse().ok()?;
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    Some((load1 / cores as f64).min(1.0))
}

fn sample_memory() -> Option<(u64, u64)> {
    let meminfo = fs::read_to_string("/proc/meminfo").ok()?;
    let mut total_kb = None;
    let mut available_kb = None;
    for line in meminfo.lines() {
        if let Some(rest) = line.strip_prefix("MemTotal:") {
            total_kb = parse_kb(rest);
        } else if let Some(rest) = line.strip_prefix("MemAvailable:") {
            available_kb = parse_kb(rest);
        }
        if total_kb.is_some() && available_kb.is_some() {
            break;
        }
    }
    Some((total_kb?, available_kb?))
}

fn parse_kb(rest: &str) -> Option<u64> {
    rest.trim().trim_end_matches(" kB").trim().parse().ok()
}
