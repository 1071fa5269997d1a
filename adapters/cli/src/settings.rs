//! Loading of route definitions and session configuration files.

use std::{fs, io::Write, path::Path};

use anyhow::{Context, Result};
use trip_telemetry_core::{Waypoint, WaypointKind};
use trip_telemetry_route::{RouteDefinition, WaypointRoute};
use trip_telemetry_session::SessionConfig;

/// Reads and validates the route at `path`, or the sample route when absent.
pub(crate) fn load_route(path: Option<&Path>) -> Result<WaypointRoute> {
    let definition = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read route definition at {}", path.display()))?;
            parse_route(&contents)
                .with_context(|| format!("failed to parse route definition {}", path.display()))?
        }
        None => sample_route(),
    };

    definition
        .into_route()
        .context("route definition failed validation")
}

/// Reads the session configuration at `path`, or the defaults when absent.
pub(crate) fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read session config at {}", path.display()))?;
    parse_config(&contents)
        .with_context(|| format!("failed to parse session config {}", path.display()))
}

/// Prints one line per waypoint with its kilometre marker.
pub(crate) fn write_route(route: &WaypointRoute, out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "{} ({} waypoints, {:.1} km)",
        route.name().unwrap_or("Unnamed route"),
        route.len(),
        route.total_length_km()
    )?;

    for waypoint in route.iter() {
        write!(
            out,
            "{:>6.1} km  {:<9} {}",
            waypoint.distance_from_start_km(),
            waypoint.kind().to_string(),
            waypoint.label()
        )?;
        if let Some(detail) = waypoint.detail() {
            write!(out, " ({detail})")?;
        }
        writeln!(out)?;
    }

    Ok(())
}

fn parse_route(contents: &str) -> Result<RouteDefinition> {
    toml::from_str(contents).context("invalid route toml")
}

fn parse_config(contents: &str) -> Result<SessionConfig> {
    toml::from_str(contents).context("invalid session config toml")
}

fn sample_route() -> RouteDefinition {
    RouteDefinition {
        id: Some("1".to_owned()),
        name: Some("CMS - Lekki".to_owned()),
        waypoints: vec![
            Waypoint::new("w1", WaypointKind::Stop, "CMS Terminal", 0.0)
                .with_detail("Start Point"),
            Waypoint::new("w2", WaypointKind::Landmark, "Muson Centre", 1.2)
                .with_detail("Keep Left after this"),
            Waypoint::new("w3", WaypointKind::Turn, "Bonny Camp Junction", 2.5)
                .with_detail("Turn Left onto Ozumba"),
            Waypoint::new("w4", WaypointKind::Stop, "Victoria Island (1004)", 4.0)
                .with_detail("Bus Stop"),
            Waypoint::new("w5", WaypointKind::Landmark, "Lekki Toll Gate", 8.5)
                .with_detail("Prepare for tolls"),
            Waypoint::new("w6", WaypointKind::Stop, "Lekki Phase 1", 12.0)
                .with_detail("Destination"),
        ],
    }
}
