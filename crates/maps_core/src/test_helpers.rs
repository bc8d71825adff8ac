//! Shared in-memory fakes for pipeline, simulator, and gateway tests.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::error::{MapsError, UpstreamService};
use crate::upstream::{
    BusinessApi, Contract, Customer, EmailMessage, Notifier, PositionRecord, PositionUpdate,
    Route, Vehicle,
};

/// Build a route record without the serde boilerplate.
pub fn route(
    id: &str,
    vehicle_id: &str,
    starting_place: &str,
    ending_place: &str,
    contract_id: Option<&str>,
) -> Route {
    Route {
        id: id.to_string(),
        vehicle_id: vehicle_id.to_string(),
        starting_place: starting_place.to_string(),
        ending_place: ending_place.to_string(),
        contract_id: contract_id.map(str::to_string),
    }
}

/// Per-method call counters, for asserting short-circuit behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub routes: usize,
    pub contracts: usize,
    pub customers: usize,
    pub vehicles: usize,
    pub updates: usize,
    pub positions: usize,
}

/// In-memory business service. Populate with the `with_*` builders before
/// handing it to the code under test. Unknown contract/customer/vehicle ids
/// answer like the real service: a 404 status error. Unknown vehicle ids
/// for the route listing answer with an empty array.
#[derive(Debug, Default)]
pub struct FakeBusiness {
    routes: HashMap<String, Vec<Route>>,
    contracts: HashMap<String, Contract>,
    customers: HashMap<String, Value>,
    vehicles: HashMap<String, Value>,
    position_records: Vec<Value>,
    calls: Mutex<CallCounts>,
}

impl FakeBusiness {
    pub fn with_route(mut self, vehicle_id: &str, route: Route) -> Self {
        self.routes
            .entry(vehicle_id.to_string())
            .or_default()
            .push(route);
        self
    }

    pub fn with_contract(mut self, contract: Contract) -> Self {
        self.contracts.insert(contract.id.clone(), contract);
        self
    }

    pub fn with_customer(mut self, customer_id: &str, customer: Value) -> Self {
        self.customers.insert(customer_id.to_string(), customer);
        self
    }

    pub fn with_vehicle(mut self, vehicle_id: &str, vehicle: Value) -> Self {
        self.vehicles.insert(vehicle_id.to_string(), vehicle);
        self
    }

    pub fn with_position_records(mut self, records: Vec<Value>) -> Self {
        self.position_records = records;
        self
    }

    pub fn calls(&self) -> CallCounts {
        *self.calls.lock().expect("call counter lock")
    }

    fn count(&self, bump: impl FnOnce(&mut CallCounts)) {
        bump(&mut self.calls.lock().expect("call counter lock"));
    }
}

fn missing(kind: &str, id: &str) -> MapsError {
    MapsError::UpstreamStatus {
        service: UpstreamService::Business,
        status: 404,
        body: format!("{kind} {id} not found"),
    }
}

impl BusinessApi for FakeBusiness {
    fn routes_by_vehicle(&self, vehicle_id: &str) -> Result<Vec<Route>, MapsError> {
        self.count(|calls| calls.routes += 1);
        Ok(self.routes.get(vehicle_id).cloned().unwrap_or_default())
    }

    fn contract(&self, contract_id: &str) -> Result<Contract, MapsError> {
        self.count(|calls| calls.contracts += 1);
        self.contracts
            .get(contract_id)
            .cloned()
            .ok_or_else(|| missing("contract", contract_id))
    }

    fn customer(&self, customer_id: &str) -> Result<Customer, MapsError> {
        self.count(|calls| calls.customers += 1);
        self.customers
            .get(customer_id)
            .cloned()
            .ok_or_else(|| missing("customer", customer_id))
    }

    fn vehicle(&self, vehicle_id: &str) -> Result<Vehicle, MapsError> {
        self.count(|calls| calls.vehicles += 1);
        self.vehicles
            .get(vehicle_id)
            .cloned()
            .ok_or_else(|| missing("vehicle", vehicle_id))
    }

    fn update_position(&self, update: &PositionUpdate) -> Result<Value, MapsError> {
        self.count(|calls| calls.updates += 1);
        serde_json::to_value(update)
            .map_err(|err| MapsError::Unexpected(format!("encode update: {err}")))
    }

    fn vehicle_positions(&self) -> Result<Vec<PositionRecord>, MapsError> {
        self.count(|calls| calls.positions += 1);
        Ok(self.position_records.clone())
    }
}

/// Notifier that records every message; flip `failing()` to simulate the
/// notifications service rejecting the send.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    fail: bool,
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("sent lock").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn send_email(&self, message: &EmailMessage) -> Result<(), MapsError> {
        if self.fail {
            return Err(MapsError::UpstreamStatus {
                service: UpstreamService::Notifications,
                status: 500,
                body: "smtp unavailable".to_string(),
            });
        }
        self.sent.lock().expect("sent lock").push(message.clone());
        Ok(())
    }
}
