//! Typed access to the two upstream services: business (vehicles, routes,
//! contracts, customers) and notifications (email).
//!
//! Policy is single-attempt and fail-fast: no retries, and the first failed
//! call aborts the calling pipeline step. The trait seams exist so the
//! pipeline and simulator can run against in-memory fakes in tests.

pub mod business;
pub mod notify;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MapsError;

/// Business-service route record. Pass-through except for the link fields
/// the pipeline chains on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub vehicle_id: String,
    pub starting_place: String,
    pub ending_place: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<String>,
}

/// Business-service contract record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}

/// Customer, vehicle, and stored-position records are owned by the business
/// service; this service passes them through without interpreting them
/// (except for the customer's optional `email` field, read by the gateway).
pub type Customer = Value;
pub type Vehicle = Value;
pub type PositionRecord = Value;

/// Position update forwarded verbatim to the business service. Field names
/// match the business wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionUpdate {
    #[serde(rename = "vehiculoId")]
    pub vehiculo_id: String,
    #[serde(rename = "latitudInicial")]
    pub latitud_inicial: f64,
    #[serde(rename = "longitudInicial")]
    pub longitud_inicial: f64,
    #[serde(rename = "latitudFinal", skip_serializing_if = "Option::is_none")]
    pub latitud_final: Option<f64>,
    #[serde(rename = "longitudFinal", skip_serializing_if = "Option::is_none")]
    pub longitud_final: Option<f64>,
}

/// Payload for the notifications service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub subject: String,
    pub recipient: String,
    pub body_html: String,
}

/// Calls against the business service.
pub trait BusinessApi: Send + Sync {
    fn routes_by_vehicle(&self, vehicle_id: &str) -> Result<Vec<Route>, MapsError>;
    fn contract(&self, contract_id: &str) -> Result<Contract, MapsError>;
    fn customer(&self, customer_id: &str) -> Result<Customer, MapsError>;
    fn vehicle(&self, vehicle_id: &str) -> Result<Vehicle, MapsError>;
    fn update_position(&self, update: &PositionUpdate) -> Result<Value, MapsError>;
    fn vehicle_positions(&self) -> Result<Vec<PositionRecord>, MapsError>;
}

/// Calls against the notifications service.
pub trait Notifier: Send + Sync {
    fn send_email(&self, message: &EmailMessage) -> Result<(), MapsError>;
}
