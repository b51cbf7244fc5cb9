//! Sessions command: list the sessions of a championship year.

use std::fmt::Write;

use anyhow::Result;
use pitwall_core::record::Session;
use pitwall_openf1::Client;

use crate::config::Config;

/// Fetch and print the sessions of a year, optionally location-filtered.
pub async fn run(config: &Config, year: u16, location: Option<&str>, json: bool) -> Result<()> {
    let client = Client::new(&config.base_url, config.timeout())?;

    let sessions = client.sessions(year).await?;
    if sessions.is_empty() {
        anyhow::bail!("no sessions found for {year}; check the year");
    }

    let matched = match filter_by_location(sessions, location) {
        Ok(matched) => matched,
        Err(available) => anyhow::bail!(
            "no sessions at '{}' in {year}; available locations: {}",
            location.unwrap_or_default(),
            available.join(", ")
        ),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&matched)?);
    } else {
        print!("{}", render(year, &matched));
    }
    Ok(())
}

/// Case-insensitive location substring filter.
///
/// `Err` carries the distinct available locations, sorted, when nothing
/// matched the filter. Without a filter every session passes through.
fn filter_by_location(
    sessions: Vec<Session>,
    location: Option<&str>,
) -> Result<Vec<Session>, Vec<String>> {
    let Some(needle) = location else {
        return Ok(sessions);
    };
    let needle = needle.to_lowercase();

    let (matched, rest): (Vec<Session>, Vec<Session>) = sessions.into_iter().partition(|session| {
        session
            .location
            .as_deref()
            .is_some_and(|loc| loc.to_lowercase().contains(&needle))
    });

    if matched.is_empty() {
        let mut available: Vec<String> = rest.into_iter().filter_map(|s| s.location).collect();
        available.sort();
        available.dedup();
        Err(available)
    } else {
        Ok(matched)
    }
}

/// Render the session list as a text table.
fn render(year: u16, sessions: &[Session]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Sessions in {year} ({} found)", sessions.len());
    for session in sessions {
        let date = session.date_start.map_or_else(
            || "-".to_string(),
            |start| start.format("%Y-%m-%d %H:%M UTC").to_string(),
        );
        let _ = writeln!(
            out,
            "  {:<7} {:<22} {:<16} {:<16} {date}",
            session.session_key,
            session.session_name.as_deref().unwrap_or("-"),
            session.location.as_deref().unwrap_or("-"),
            session.country_name.as_deref().unwrap_or("-"),
        );
    }
    out
}
