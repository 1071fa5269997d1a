//! Fixed-interval clock that drives a session and renders the driver display.

use std::{io::Write, thread, time::Duration};

use anyhow::Result;
use tracing::warn;
use trip_telemetry_core::{Command, Event, LimitState, TripStatus};
use trip_telemetry_session::{apply, TripSession, TripSnapshot};
use trip_telemetry_system_speed_sampler::RandomSource;

/// How the clock paces and bounds a drive.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DriveOptions {
    /// Simulated duration of each tick.
    pub(crate) tick: Duration,
    /// Tick budget after which a running trip is terminated.
    pub(crate) max_ticks: Option<u64>,
    /// Whether to sleep for `tick` between ticks.
    pub(crate) realtime: bool,
}

/// Outcome of a finished drive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DriveSummary {
    pub(crate) status: TripStatus,
    pub(crate) ticks: u64,
    pub(crate) elapsed: Duration,
    pub(crate) alerts: u32,
}

/// Ticks `session` until it completes or the tick budget runs out.
pub(crate) fn drive<R: RandomSource, W: Write>(
    session: &mut TripSession<'_, R>,
    options: &DriveOptions,
    out: &mut W,
) -> Result<DriveSummary> {
    let mut events = Vec::new();
    let mut alerts = 0_u32;

    let start = session.snapshot();
    if start.is_over_limit {
        write_alert(out, start.current_speed_kmh, start.speed_limit_kmh, &mut alerts)?;
    }

    while session.status() == TripStatus::Running {
        events.clear();

        let ticks = session.snapshot().tick_count;
        if options.max_ticks.is_some_and(|max| ticks >= max) {
            warn!(ticks, "tick budget exhausted, ending trip");
            apply(session, Command::Terminate, &mut events);
            write_events(session, &events, out, &mut alerts)?;
            break;
        }

        apply(session, Command::Tick { dt: options.tick }, &mut events);
        write_events(session, &events, out, &mut alerts)?;
        write_status(session, out)?;

        if options.realtime && session.status() == TripStatus::Running {
            thread::sleep(options.tick);
        }
    }

    let snapshot = session.snapshot();
    Ok(DriveSummary {
        status: snapshot.status,
        ticks: snapshot.tick_count,
        elapsed: snapshot.elapsed,
        alerts,
    })
}

/// Prints the closing line of a drive.
pub(crate) fn write_summary(summary: &DriveSummary, out: &mut impl Write) -> Result<()> {
    let outcome = match summary.status {
        TripStatus::Completed => "route completed",
        TripStatus::Terminated => "route ended early",
        TripStatus::Running => "route still running",
    };
    writeln!(
        out,
        "{outcome} after {} ticks ({}), {} speed alert(s)",
        summary.ticks,
        format_elapsed(summary.elapsed),
        summary.alerts
    )?;
    Ok(())
}

fn write_events<R: RandomSource>(
    session: &TripSession<'_, R>,
    events: &[Event],
    out: &mut impl Write,
    alerts: &mut u32,
) -> Result<()> {
    let route = session.route();
    for event in events {
        match event {
            Event::SpeedLimitCrossed {
                state: LimitState::Exceeding,
                speed_kmh,
                limit_kmh,
            } => write_alert(out, *speed_kmh, *limit_kmh, alerts)?,
            Event::SpeedLimitCrossed {
                state: LimitState::Normal,
                speed_kmh,
                ..
            } => writeln!(out, "   back within limit at {speed_kmh:.0} km/h")?,
            Event::WaypointReached { index, .. } => {
                if let Ok(waypoint) = route.waypoint_at(*index) {
                    write!(out, ">> {} {}", waypoint.kind(), waypoint.label())?;
                    if let Some(detail) = waypoint.detail() {
                        write!(out, ": {detail}")?;
                    }
                    writeln!(out)?;
                }
            }
            Event::TripCompleted { elapsed } => {
                writeln!(
                    out,
                    "== arrived at {} after {}",
                    route.last().label(),
                    format_elapsed(*elapsed)
                )?;
            }
            Event::TripTerminated { at_index } => {
                if let Ok(waypoint) = route.waypoint_at(*at_index) {
                    writeln!(out, "== route ended after {}", waypoint.label())?;
                }
            }
            Event::TimeAdvanced { .. } | Event::SpeedSampled { .. } => {}
        }
    }
    Ok(())
}

fn write_alert(
    out: &mut impl Write,
    speed_kmh: f64,
    limit_kmh: f64,
    alerts: &mut u32,
) -> Result<()> {
    *alerts = alerts.saturating_add(1);
    writeln!(out, "!! SLOW DOWN: {speed_kmh:.0} km/h in a {limit_kmh:.0} km/h zone")?;
    Ok(())
}

fn write_status<R: RandomSource>(
    session: &TripSession<'_, R>,
    out: &mut impl Write,
) -> Result<()> {
    let snapshot = session.snapshot();
    write!(
        out,
        "[{}] {:>5.1} km/h",
        format_elapsed(snapshot.elapsed),
        snapshot.current_speed_kmh
    )?;
    match session.next_stop() {
        Some(stop) => write!(
            out,
            " | next stop {} {:.1} km away",
            stop.waypoint.label(),
            stop.distance_km
        )?,
        None => write!(out, " | no further stops")?,
    }
    writeln!(out, " | {}", percent_complete(&snapshot))?;
    Ok(())
}

fn percent_complete(snapshot: &TripSnapshot<'_>) -> String {
    format!("{:.0}% complete", snapshot.progress_fraction * 100.0)
}

fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", total / 3_600, (total / 60) % 60, total % 60)
}
