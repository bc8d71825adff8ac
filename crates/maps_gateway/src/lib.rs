//! Gateway layer: the operations the frontend calls, with the original wire
//! field names, input validation, and error → status mapping.
//!
//! Transport framing (HTTP routing, CORS, JSON parsing) is deliberately
//! absent; this layer is the contract a transport would wrap. Everything
//! here validates first, then delegates to `maps_core`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use maps_core::config::MapsConfig;
use maps_core::coords::CoordinateDirectory;
use maps_core::error::{MapsError, PipelineStage, UpstreamService};
use maps_core::pipeline::ResolutionPipeline;
use maps_core::simulator::{RunHandle, Simulator};
use maps_core::upstream::business::BusinessClient;
use maps_core::upstream::notify::NotificationsClient;
use maps_core::upstream::{BusinessApi, PositionRecord, PositionUpdate};

/// Incoming position update. Every field optional so validation can name
/// the first missing one instead of serde rejecting the body outright.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePositionRequest {
    #[serde(rename = "vehiculoId")]
    pub vehiculo_id: Option<String>,
    #[serde(rename = "latitudInicial")]
    pub latitud_inicial: Option<f64>,
    #[serde(rename = "longitudInicial")]
    pub longitud_inicial: Option<f64>,
    #[serde(rename = "latitudFinal")]
    pub latitud_final: Option<f64>,
    #[serde(rename = "longitudFinal")]
    pub longitud_final: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct UpdatePositionResponse {
    pub message: String,
    pub data: Value,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct CoordinatesResponse {
    pub latitud_inicial: f64,
    pub longitud_inicial: f64,
    pub latitud_final: f64,
    pub longitud_final: f64,
}

#[derive(Debug, Serialize)]
pub struct AggregateResponse {
    #[serde(rename = "vehiculoId")]
    pub vehiculo_id: String,
    pub contrato: maps_core::upstream::Contract,
    pub vehiculo: Value,
    pub cliente: Value,
}

#[derive(Debug, Serialize)]
pub struct SimulationStarted {
    pub message: String,
    #[serde(rename = "vehiculoId")]
    pub vehiculo_id: String,
    #[serde(rename = "runId")]
    pub run_id: u64,
}

/// Error JSON shape the original service answered with.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

pub struct Gateway {
    business: Arc<dyn BusinessApi>,
    directory: CoordinateDirectory,
    simulator: Simulator,
}

impl Gateway {
    pub fn new(
        business: Arc<dyn BusinessApi>,
        directory: CoordinateDirectory,
        simulator: Simulator,
    ) -> Self {
        Self {
            business,
            directory,
            simulator,
        }
    }

    /// Wire up real HTTP clients and load the coordinate directory.
    pub fn from_config(config: &MapsConfig) -> Self {
        let business = Arc::new(BusinessClient::new(&config.business_url));
        let notifier = Arc::new(NotificationsClient::new(&config.notifications_url));
        let directory = CoordinateDirectory::load(&config.coordinates_path);
        Self::new(business, directory, Simulator::new(notifier))
    }

    fn pipeline(&self) -> ResolutionPipeline<'_> {
        ResolutionPipeline::new(self.business.as_ref(), &self.directory)
    }

    /// Validate the required fields, then forward to the business service.
    /// Final latitude/longitude are optional passthrough.
    pub fn update_position(
        &self,
        request: &UpdatePositionRequest,
    ) -> Result<UpdatePositionResponse, MapsError> {
        let vehiculo_id = request
            .vehiculo_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| MapsError::Validation("vehiculoId es requerido".to_string()))?;
        let latitud_inicial = request
            .latitud_inicial
            .ok_or_else(|| MapsError::Validation("latitudInicial es requerido".to_string()))?;
        let longitud_inicial = request
            .longitud_inicial
            .ok_or_else(|| MapsError::Validation("longitudInicial es requerido".to_string()))?;

        let update = PositionUpdate {
            vehiculo_id: vehiculo_id.to_string(),
            latitud_inicial,
            longitud_inicial,
            latitud_final: request.latitud_final,
            longitud_final: request.longitud_final,
        };
        let data = self.business.update_position(&update)?;
        Ok(UpdatePositionResponse {
            message: format!("Posición del vehículo {vehiculo_id} actualizada exitosamente."),
            data,
        })
    }

    /// Passthrough of the business service's stored positions.
    pub fn list_vehicle_positions(&self) -> Result<Vec<PositionRecord>, MapsError> {
        self.business.vehicle_positions()
    }

    pub fn resolve_coordinates(&self, vehicle_id: &str) -> Result<CoordinatesResponse, MapsError> {
        let coords = self.pipeline().resolve_coordinates_for_vehicle(vehicle_id)?;
        Ok(CoordinatesResponse {
            latitud_inicial: coords.start.latitude,
            longitud_inicial: coords.start.longitude,
            latitud_final: coords.end.latitude,
            longitud_final: coords.end.longitude,
        })
    }

    pub fn resolve_aggregate(&self, vehicle_id: &str) -> Result<AggregateResponse, MapsError> {
        let aggregate = self.pipeline().resolve_aggregate_for_vehicle(vehicle_id)?;
        Ok(AggregateResponse {
            vehiculo_id: aggregate.vehicle_id,
            contrato: aggregate.contract,
            vehiculo: aggregate.vehicle,
            cliente: aggregate.customer,
        })
    }

    /// Resolve the aggregate (for the customer's email) and the route
    /// coordinates, then start a detached run. Returns immediately; the
    /// handle is for callers that want to join (the CLI does), everyone
    /// else drops it.
    pub fn start_trip_simulation(
        &self,
        vehicle_id: &str,
    ) -> Result<(SimulationStarted, RunHandle), MapsError> {
        let aggregate = self.pipeline().resolve_aggregate_for_vehicle(vehicle_id)?;
        let email = aggregate
            .customer
            .get("email")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                MapsError::not_found(
                    PipelineStage::Customer,
                    format!("customer for vehicle {vehicle_id} has no email address"),
                )
            })?
            .to_string();
        let coords = self.pipeline().resolve_coordinates_for_vehicle(vehicle_id)?;

        let handle = self
            .simulator
            .start(Some(coords.start), Some(coords.end), &email, vehicle_id)
            .ok_or_else(|| {
                MapsError::Unexpected("simulation skipped despite resolved coordinates".to_string())
            })?;

        Ok((
            SimulationStarted {
                message: format!("Simulación iniciada para el vehículo {vehicle_id}."),
                vehiculo_id: vehicle_id.to_string(),
                run_id: handle.id,
            },
            handle,
        ))
    }
}

/// HTTP-style status for an error, for transports and the CLI exit path.
pub fn error_status(err: &MapsError) -> u16 {
    match err {
        MapsError::Validation(_) => 400,
        MapsError::NotFound { .. } => 404,
        MapsError::Upstream { .. } | MapsError::UpstreamStatus { .. } => 502,
        MapsError::Unexpected(_) => 500,
    }
}

/// Error JSON in the original service's shape: a stable headline per error
/// class plus the specific cause in `details`.
pub fn error_body(err: &MapsError) -> ErrorBody {
    let error = match err {
        MapsError::Validation(_) => "Solicitud inválida.",
        MapsError::NotFound { .. } => "Recurso no encontrado.",
        MapsError::Upstream { service, .. } | MapsError::UpstreamStatus { service, .. } => {
            match service {
                UpstreamService::Business => "Error al comunicarse con el microservicio de negocio.",
                UpstreamService::Notifications => {
                    "Error al comunicarse con el microservicio de notificaciones."
                }
            }
        }
        MapsError::Unexpected(_) => "Error inesperado.",
    };
    ErrorBody {
        error: error.to_string(),
        details: err.to_string(),
    }
}
