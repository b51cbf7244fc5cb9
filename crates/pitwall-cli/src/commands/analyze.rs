//! Analyze command: the tire-stint report for one driver in one session.

use std::fmt::Write;

use anyhow::{Context, Result};
use pitwall_core::analysis::StintAnalysis;
use pitwall_core::types::{DriverNumber, SessionKey};
use pitwall_openf1::{Analyzer, Client};

use crate::config::Config;

/// Run the analysis and print it as text or JSON.
pub async fn run(config: &Config, session: u32, driver: u32, json: bool) -> Result<()> {
    let session = SessionKey::new(session).context("invalid session key")?;
    let driver = DriverNumber::new(driver).context("invalid driver number")?;

    let client = Client::new(&config.base_url, config.timeout())?;
    let analyzer = Analyzer::new(client);
    let analysis = analyzer.analyze(session, driver).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print!("{}", render(&analysis));
    }
    Ok(())
}

/// Render the analysis as a text report.
fn render(analysis: &StintAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Tire strategy: {} (#{}), session {}",
        analysis.driver_name, analysis.driver_number, analysis.session_key
    );

    for (position, stint) in analysis.stints.iter().enumerate() {
        let _ = writeln!(out, "\nStint {}: {}", position + 1, stint.compound);
        let _ = writeln!(
            out,
            "  laps {}-{} ({} timed)",
            stint.start_lap, stint.end_lap, stint.lap_count
        );
        let _ = writeln!(
            out,
            "  average {}   degradation {:+.3}s/lap   total {:.1}s",
            format_lap_time(stint.avg_lap_time),
            stint.degradation_per_lap,
            stint.total_time
        );
    }

    let _ = writeln!(out, "\nPit stops: {}", analysis.pit_stops);
    if let Some(note) = &analysis.note {
        let _ = writeln!(out, "Note: {note}");
    }
    out
}

/// Format seconds as `m:ss.mmm`.
///
/// Rounds through integer milliseconds so a value like 59.9996 carries into
/// the minute instead of printing as `0:60.000`.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "lap times are small positive values"
)]
fn format_lap_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00.000".to_string();
    }
    let total_ms = (seconds * 1000.0).round() as u64;
    let minutes = total_ms / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{minutes}:{secs:02}.{millis:03}")
}
