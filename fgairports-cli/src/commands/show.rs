//! Show command - full detail of one airport.

use std::path::Path;

use fgairports::airport::{Airport, Runway};
use fgairports::database::AirportDatabase;

use super::common::{database_config, format_length, load_config, print_json};
use crate::error::CliError;

/// Run the show command.
pub fn run(config_path: Option<&Path>, icao: &str, json: bool) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let mut db = AirportDatabase::open(database_config(&config)?, None)?;
    let airport = db.airport(icao)?;

    if json {
        return print_json(&*airport);
    }
    print_airport(&airport);
    Ok(())
}

fn print_airport(airport: &Airport) {
    println!("{} - {}", airport.icao, airport.name);
    println!("  Type:      {}", airport.airport_type);
    println!("  Position:  {:.6}, {:.6}", airport.lat, airport.lon);
    println!("  Elevation: {}", format_length(airport.elevation_m));
    println!(
        "  Source:    file #{}, line {}",
        airport.source.file_index, airport.source.line_number
    );

    let runways = airport.runways();
    if !runways.is_empty() {
        println!();
        println!("Runways:");
        for runway in &runways {
            print_runway(runway);
        }
    }

    if airport.parking_count() > 0 {
        println!();
        println!("Parking positions:");
        for (parking_type, parkings) in &airport.parkings {
            let label = if parking_type.is_empty() {
                "startup"
            } else {
                parking_type.as_str()
            };
            let names: Vec<String> = parkings.iter().map(|p| p.full_name()).collect();
            println!("  {:<10} {}", label, names.join(", "));
        }
    }
}

fn print_runway(runway: &Runway) {
    let kind = match runway {
        Runway::Land(_) => "land",
        Runway::Water(_) => "water",
        Runway::Helipad(_) => "helipad",
    };
    let (lat, lon) = runway.position();
    println!(
        "  {:<5} {:<8} heading {:>6.2}  {:<20} at {:.6}, {:.6}",
        runway.name(),
        kind,
        runway.heading(),
        format_length(runway.length_m()),
        lat,
        lon
    );
}
