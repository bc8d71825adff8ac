//! Command-line front for the gateway operations. Talks to the upstream
//! services configured via `MAPS_BUSINESS_URL` / `MAPS_NOTIFICATIONS_URL`
//! and prints responses as JSON.

use std::process::exit;

use clap::{Parser, Subcommand};
use serde::Serialize;

use maps_core::config::MapsConfig;
use maps_core::error::MapsError;
use maps_gateway::{error_body, error_status, Gateway, UpdatePositionRequest};

#[derive(Parser)]
#[command(
    name = "maps-gateway",
    about = "Fleet maps gateway: position forwarding, route resolution, trip simulation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List vehicles with their stored positions
    Positions,
    /// Forward a position update to the business service
    UpdatePosition {
        #[arg(long)]
        vehiculo_id: String,
        #[arg(long)]
        latitud_inicial: f64,
        #[arg(long)]
        longitud_inicial: f64,
        #[arg(long)]
        latitud_final: Option<f64>,
        #[arg(long)]
        longitud_final: Option<f64>,
    },
    /// Resolve start/end coordinates for a vehicle's first route
    Coordinates { vehiculo_id: String },
    /// Resolve the vehicle/contract/customer aggregate
    Aggregate { vehiculo_id: String },
    /// Start a trip simulation and wait for it to finish
    Simulate { vehiculo_id: String },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let gateway = Gateway::from_config(&MapsConfig::from_env());

    let result = match cli.command {
        Commands::Positions => print_json(gateway.list_vehicle_positions()),
        Commands::UpdatePosition {
            vehiculo_id,
            latitud_inicial,
            longitud_inicial,
            latitud_final,
            longitud_final,
        } => {
            let request = UpdatePositionRequest {
                vehiculo_id: Some(vehiculo_id),
                latitud_inicial: Some(latitud_inicial),
                longitud_inicial: Some(longitud_inicial),
                latitud_final,
                longitud_final,
            };
            print_json(gateway.update_position(&request))
        }
        Commands::Coordinates { vehiculo_id } => {
            print_json(gateway.resolve_coordinates(&vehiculo_id))
        }
        Commands::Aggregate { vehiculo_id } => print_json(gateway.resolve_aggregate(&vehiculo_id)),
        Commands::Simulate { vehiculo_id } => {
            match gateway.start_trip_simulation(&vehiculo_id) {
                Ok((started, handle)) => {
                    // The run is detached for API callers; the CLI joins so
                    // the process outlives the 100 steps and the email.
                    let printed = print_json(Ok(started));
                    handle.join();
                    log::info!("simulation for vehicle {vehiculo_id} finished");
                    printed
                }
                Err(err) => Err(err),
            }
        }
    };

    if let Err(err) = result {
        let status = error_status(&err);
        let body = error_body(&err);
        match serde_json::to_string_pretty(&body) {
            Ok(json) => eprintln!("{status} {json}"),
            Err(_) => eprintln!("{status} {}", body.error),
        }
        exit(1);
    }
}

fn print_json<T: Serialize>(result: Result<T, MapsError>) -> Result<(), MapsError> {
    let value = result?;
    let json = serde_json::to_string_pretty(&value)
        .map_err(|err| MapsError::Unexpected(format!("encode response: {err}")))?;
    println!("{json}");
    Ok(())
}
