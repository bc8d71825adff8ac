//! Blocking HTTP client for the business service.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{BusinessApi, Contract, Customer, PositionRecord, PositionUpdate, Route, Vehicle};
use crate::error::{MapsError, UpstreamService};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct BusinessClient {
    client: Client,
    base_url: String,
}

impl BusinessClient {
    /// Create a client for the given base URL (e.g. `http://localhost:3333`).
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build business client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, MapsError> {
        let response = self
            .client
            .get(self.endpoint(path))
            .send()
            .map_err(transport)?;
        decode(response)
    }
}

impl BusinessApi for BusinessClient {
    fn routes_by_vehicle(&self, vehicle_id: &str) -> Result<Vec<Route>, MapsError> {
        self.get_json(&format!("/routes/by-vehicle/{vehicle_id}"))
    }

    fn contract(&self, contract_id: &str) -> Result<Contract, MapsError> {
        self.get_json(&format!("/contracts/{contract_id}"))
    }

    fn customer(&self, customer_id: &str) -> Result<Customer, MapsError> {
        self.get_json(&format!("/customers/{customer_id}"))
    }

    fn vehicle(&self, vehicle_id: &str) -> Result<Vehicle, MapsError> {
        self.get_json(&format!("/vehiculos/{vehicle_id}"))
    }

    fn update_position(&self, update: &PositionUpdate) -> Result<Value, MapsError> {
        let response = self
            .client
            .put(self.endpoint("/vehiculos/actualizar-posicion"))
            .json(update)
            .send()
            .map_err(transport)?;
        decode(response)
    }

    fn vehicle_positions(&self) -> Result<Vec<PositionRecord>, MapsError> {
        self.get_json("/vehiculos/posiciones")
    }
}

fn transport(source: reqwest::Error) -> MapsError {
    MapsError::Upstream {
        service: UpstreamService::Business,
        source,
    }
}

/// Non-2xx becomes `UpstreamStatus` with whatever body text was readable;
/// a 2xx body that fails to decode is `Unexpected`.
fn decode<T: DeserializeOwned>(response: Response) -> Result<T, MapsError> {
    let status = response.status();
    if !status.is_success() {
        return Err(MapsError::UpstreamStatus {
            service: UpstreamService::Business,
            status: status.as_u16(),
            body: response.text().unwrap_or_default(),
        });
    }
    response.json().map_err(|err| {
        MapsError::Unexpected(format!("business service returned malformed JSON: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_normalizes_trailing_slash() {
        let client = BusinessClient::new("http://localhost:3333/");
        assert_eq!(
            client.endpoint("/routes/by-vehicle/V1"),
            "http://localhost:3333/routes/by-vehicle/V1"
        );
    }
}
