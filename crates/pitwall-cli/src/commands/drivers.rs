//! Drivers command: the entry list of a session.

use std::fmt::Write;

use anyhow::{Context, Result};
use pitwall_core::record::Driver;
use pitwall_core::types::SessionKey;
use pitwall_openf1::{Client, TimingSource};

use crate::config::Config;

/// Fetch and print the session roster.
pub async fn run(config: &Config, session: u32, json: bool) -> Result<()> {
    let session = SessionKey::new(session).context("invalid session key")?;
    let client = Client::new(&config.base_url, config.timeout())?;

    let mut drivers = client.drivers(session, None).await?;
    if drivers.is_empty() {
        anyhow::bail!("no drivers found in session {session}; check the session key");
    }
    drivers.sort_by_key(|driver| driver.driver_number);

    if json {
        println!("{}", serde_json::to_string_pretty(&drivers)?);
    } else {
        print!("{}", render(session, &drivers));
    }
    Ok(())
}

/// Render the roster as a text table.
fn render(session: SessionKey, drivers: &[Driver]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Drivers in session {session} ({} entries)",
        drivers.len()
    );
    for driver in drivers {
        let _ = writeln!(
            out,
            "  #{:<3} {:<24} {:<28} {}",
            driver.driver_number,
            driver.display_name(),
            driver.team_name.as_deref().unwrap_or("-"),
            driver.name_acronym.as_deref().unwrap_or("-"),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(number: u32, first: &str, last: &str, team: &str, acronym: &str) -> Driver {
        Driver {
            driver_number: number,
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            team_name: Some(team.to_string()),
            name_acronym: Some(acronym.to_string()),
        }
    }

    #[test]
    fn render_lists_each_entry() {
        let drivers = vec![
            driver(1, "Max", "Verstappen", "Red Bull Racing", "VER"),
            driver(44, "Lewis", "Hamilton", "Ferrari", "HAM"),
        ];
        let text = render(SessionKey::new(9161).unwrap(), &drivers);
        assert!(text.contains("Drivers in session 9161 (2 entries)"));
        assert!(text.contains("#1"));
        assert!(text.contains("Max Verstappen"));
        assert!(text.contains("VER"));
        assert!(text.contains("#44"));
        assert!(text.contains("Ferrari"));
    }

    #[test]
    fn render_substitutes_dashes_for_missing_fields() {
        let drivers = vec![Driver {
            driver_number: 7,
            first_name: None,
            last_name: None,
            team_name: None,
            name_acronym: None,
        }];
        let text = render(SessionKey::new(9161).unwrap(), &drivers);
        assert!(text.contains("Unknown Driver"));
        assert!(text.contains('-'));
    }
}
