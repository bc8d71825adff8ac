//! Position resolution: chains business-service lookups for one vehicle.
//!
//! Both public operations share the same discipline: strictly sequential
//! calls, each consuming the previous step's output, short-circuiting on
//! the first failure. Errors always name the stage that failed (routes /
//! contract / customer / coordinates) so callers can tell them apart.

use serde::Serialize;

use crate::coords::{Coordinate, CoordinateDirectory};
use crate::error::{MapsError, PipelineStage};
use crate::upstream::{BusinessApi, Contract, Customer, Route, Vehicle};

/// Resolved start/end coordinates for a vehicle's first route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteCoordinates {
    pub start: Coordinate,
    pub end: Coordinate,
}

/// Combined vehicle/contract/customer view for one vehicle. All fetched
/// records are pass-through, unmodified.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleAggregate {
    pub vehicle_id: String,
    pub contract: Contract,
    pub customer: Customer,
    pub vehicle: Vehicle,
}

pub struct ResolutionPipeline<'a> {
    business: &'a dyn BusinessApi,
    directory: &'a CoordinateDirectory,
}

impl<'a> ResolutionPipeline<'a> {
    pub fn new(business: &'a dyn BusinessApi, directory: &'a CoordinateDirectory) -> Self {
        Self {
            business,
            directory,
        }
    }

    /// First route in upstream order; no further selection policy.
    fn first_route(&self, vehicle_id: &str) -> Result<Route, MapsError> {
        let mut routes = self.business.routes_by_vehicle(vehicle_id)?;
        if routes.is_empty() {
            return Err(MapsError::not_found(
                PipelineStage::Routes,
                format!("vehicle {vehicle_id} has no routes"),
            ));
        }
        Ok(routes.remove(0))
    }

    fn place_coordinate(&self, place: &str) -> Result<Coordinate, MapsError> {
        self.directory.lookup(place).ok_or_else(|| {
            MapsError::not_found(
                PipelineStage::Coordinates,
                format!("coordinates unresolved for {place}"),
            )
        })
    }

    /// Route lookup, then both place lookups. No partial success: a single
    /// unresolved place fails the whole operation.
    pub fn resolve_coordinates_for_vehicle(
        &self,
        vehicle_id: &str,
    ) -> Result<RouteCoordinates, MapsError> {
        let route = self.first_route(vehicle_id)?;
        let start = self.place_coordinate(&route.starting_place)?;
        let end = self.place_coordinate(&route.ending_place)?;
        Ok(RouteCoordinates { start, end })
    }

    /// Route → contract → customer → vehicle, failing fast on the first
    /// missing link so no later upstream call is made.
    pub fn resolve_aggregate_for_vehicle(
        &self,
        vehicle_id: &str,
    ) -> Result<VehicleAggregate, MapsError> {
        let route = self.first_route(vehicle_id)?;
        let contract_id = route.contract_id.as_deref().ok_or_else(|| {
            MapsError::not_found(
                PipelineStage::Contract,
                format!("route {} has no contract", route.id),
            )
        })?;
        let contract = self.business.contract(contract_id)?;
        let customer_id = contract.customer_id.as_deref().ok_or_else(|| {
            MapsError::not_found(
                PipelineStage::Customer,
                format!("contract {} has no customer", contract.id),
            )
        })?;
        let customer = self.business.customer(customer_id)?;
        let vehicle = self.business.vehicle(vehicle_id)?;
        Ok(VehicleAggregate {
            vehicle_id: vehicle_id.to_string(),
            contract,
            customer,
            vehicle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{route, FakeBusiness};
    use serde_json::json;

    fn directory() -> CoordinateDirectory {
        CoordinateDirectory::from_entries([
            ("Chile", Coordinate::new(-33.45, -70.66)),
            ("Peru", Coordinate::new(-12.05, -77.04)),
        ])
    }

    #[test]
    fn coordinates_come_from_the_directory_unmodified() {
        let business =
            FakeBusiness::default().with_route("V1", route("R1", "V1", "Chile", "Peru", None));
        let directory = directory();
        let pipeline = ResolutionPipeline::new(&business, &directory);

        let coords = pipeline
            .resolve_coordinates_for_vehicle("V1")
            .expect("resolved");
        assert_eq!(coords.start, Coordinate::new(-33.45, -70.66));
        assert_eq!(coords.end, Coordinate::new(-12.05, -77.04));
    }

    #[test]
    fn no_routes_fails_without_further_calls() {
        let business = FakeBusiness::default();
        let directory = directory();
        let pipeline = ResolutionPipeline::new(&business, &directory);

        let coords_err = pipeline
            .resolve_coordinates_for_vehicle("V9")
            .expect_err("no routes");
        assert!(matches!(
            coords_err,
            MapsError::NotFound {
                stage: PipelineStage::Routes,
                ..
            }
        ));

        let aggregate_err = pipeline
            .resolve_aggregate_for_vehicle("V9")
            .expect_err("no routes");
        assert!(matches!(
            aggregate_err,
            MapsError::NotFound {
                stage: PipelineStage::Routes,
                ..
            }
        ));

        let calls = business.calls();
        assert_eq!(calls.routes, 2);
        assert_eq!(calls.contracts, 0);
        assert_eq!(calls.customers, 0);
        assert_eq!(calls.vehicles, 0);
    }

    #[test]
    fn one_missing_place_fails_even_if_the_other_resolves() {
        let business =
            FakeBusiness::default().with_route("V1", route("R1", "V1", "Chile", "Atlantis", None));
        let directory = directory();
        let pipeline = ResolutionPipeline::new(&business, &directory);

        let err = pipeline
            .resolve_coordinates_for_vehicle("V1")
            .expect_err("unresolved place");
        match err {
            MapsError::NotFound { stage, reason } => {
                assert_eq!(stage, PipelineStage::Coordinates);
                assert!(reason.contains("Atlantis"), "reason: {reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn route_without_contract_stops_before_contract_lookup() {
        let business =
            FakeBusiness::default().with_route("V1", route("R1", "V1", "Chile", "Peru", None));
        let directory = directory();
        let pipeline = ResolutionPipeline::new(&business, &directory);

        let err = pipeline
            .resolve_aggregate_for_vehicle("V1")
            .expect_err("no contract");
        assert!(matches!(
            err,
            MapsError::NotFound {
                stage: PipelineStage::Contract,
                ..
            }
        ));

        let calls = business.calls();
        assert_eq!(calls.contracts, 0);
        assert_eq!(calls.customers, 0);
        assert_eq!(calls.vehicles, 0);
    }

    #[test]
    fn contract_without_customer_stops_before_customer_lookup() {
        let business = FakeBusiness::default()
            .with_route("V1", route("R1", "V1", "Chile", "Peru", Some("C1")))
            .with_contract(Contract {
                id: "C1".to_string(),
                customer_id: None,
            });
        let directory = directory();
        let pipeline = ResolutionPipeline::new(&business, &directory);

        let err = pipeline
            .resolve_aggregate_for_vehicle("V1")
            .expect_err("no customer");
        assert!(matches!(
            err,
            MapsError::NotFound {
                stage: PipelineStage::Customer,
                ..
            }
        ));

        let calls = business.calls();
        assert_eq!(calls.contracts, 1);
        assert_eq!(calls.customers, 0);
        assert_eq!(calls.vehicles, 0);
    }

    #[test]
    fn aggregate_passes_all_records_through() {
        let business = FakeBusiness::default()
            .with_route("V1", route("R1", "V1", "Chile", "Peru", Some("C1")))
            .with_contract(Contract {
                id: "C1".to_string(),
                customer_id: Some("CU1".to_string()),
            })
            .with_customer("CU1", json!({"id": "CU1", "email": "ana@example.com"}))
            .with_vehicle("V1", json!({"id": "V1", "placa": "AB-1234"}));
        let directory = directory();
        let pipeline = ResolutionPipeline::new(&business, &directory);

        let aggregate = pipeline
            .resolve_aggregate_for_vehicle("V1")
            .expect("aggregate");
        assert_eq!(aggregate.vehicle_id, "V1");
        assert_eq!(aggregate.contract.customer_id.as_deref(), Some("CU1"));
        assert_eq!(aggregate.customer["email"], "ana@example.com");
        assert_eq!(aggregate.vehicle["placa"], "AB-1234");
    }

    #[test]
    fn aggregate_resolution_is_idempotent() {
        let business = FakeBusiness::default()
            .with_route("V1", route("R1", "V1", "Chile", "Peru", Some("C1")))
            .with_contract(Contract {
                id: "C1".to_string(),
                customer_id: Some("CU1".to_string()),
            })
            .with_customer("CU1", json!({"id": "CU1"}))
            .with_vehicle("V1", json!({"id": "V1"}));
        let directory = directory();
        let pipeline = ResolutionPipeline::new(&business, &directory);

        let first = pipeline
            .resolve_aggregate_for_vehicle("V1")
            .expect("first");
        let second = pipeline
            .resolve_aggregate_for_vehicle("V1")
            .expect("second");
        assert_eq!(first.vehicle_id, second.vehicle_id);
        assert_eq!(first.contract.id, second.contract.id);
        assert_eq!(first.customer, second.customer);
        assert_eq!(first.vehicle, second.vehicle);
    }
}
