//! List command - airport summaries from the digest.

use std::path::Path;

use fgairports::airport::AirportStub;
use fgairports::database::AirportDatabase;

use super::common::{database_config, load_config, print_json};
use crate::error::CliError;

/// Run the list command.
pub fn run(config_path: Option<&Path>, filter: Option<&str>, json: bool) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let db = AirportDatabase::open(database_config(&config)?, None)?;

    let stubs: Vec<&AirportStub> = match filter {
        Some(text) => db.search(text).collect(),
        None => db.airports().values().collect(),
    };

    if json {
        return print_json(&stubs);
    }

    for stub in &stubs {
        println!("{}", format_stub(stub));
    }
    println!();
    println!("{} of {} airports", stubs.len(), db.len());
    Ok(())
}

fn format_stub(stub: &AirportStub) -> String {
    let runways = match stub.runway_lengths {
        Some(range) if (range.max_m - range.min_m).abs() < 0.5 => {
            format!("{:.0} m", range.max_m)
        }
        Some(range) => format!("{:.0}-{:.0} m", range.min_m, range.max_m),
        None => "-".to_string(),
    };
    format!(
        "{:<7} {:<40} {:>10.5} {:>11.5}  rwy {:>2} wtr {:>2} heli {:>2}  {}",
        stub.icao,
        stub.name,
        stub.lat,
        stub.lon,
        stub.land_runway_count,
        stub.water_runway_count,
        stub.helipad_count,
        runways
    )
}
