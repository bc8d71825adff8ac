//! Error taxonomy shared by the pipeline, the upstream clients, and the
//! gateway layer.
//!
//! Pipeline errors surface to the triggering caller and always name the
//! stage that failed. Simulator-internal failures never use this path for
//! reporting; the simulator logs and records them instead (it runs detached
//! with no caller left to answer).

use std::fmt;

use thiserror::Error;

/// The lookup stage a pipeline failure happened at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Routes,
    Contract,
    Customer,
    Vehicle,
    Coordinates,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Routes => "routes",
            Self::Contract => "contract",
            Self::Customer => "customer",
            Self::Vehicle => "vehicle",
            Self::Coordinates => "coordinates",
        };
        f.write_str(name)
    }
}

/// Which external system a call was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamService {
    Business,
    Notifications,
}

impl fmt::Display for UpstreamService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Business => "business",
            Self::Notifications => "notifications",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum MapsError {
    /// A required input field is missing. Raised before any upstream call.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A chain step found zero results or a required link field was absent.
    #[error("not found ({stage}): {reason}")]
    NotFound {
        stage: PipelineStage,
        reason: String,
    },

    /// The upstream request never produced a response (connect, timeout,
    /// body read). Single attempt, no retries.
    #[error("{service} service request failed")]
    Upstream {
        service: UpstreamService,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered with a non-2xx status.
    #[error("{service} service returned status {status}: {body}")]
    UpstreamStatus {
        service: UpstreamService,
        status: u16,
        body: String,
    },

    /// Anything not anticipated, e.g. malformed JSON in a 2xx response.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl MapsError {
    pub fn not_found(stage: PipelineStage, reason: impl Into<String>) -> Self {
        Self::NotFound {
            stage,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_stage() {
        let err = MapsError::not_found(PipelineStage::Contract, "route R1 has no contract");
        assert_eq!(
            err.to_string(),
            "not found (contract): route R1 has no contract"
        );
    }

    #[test]
    fn upstream_status_message_carries_status_and_body() {
        let err = MapsError::UpstreamStatus {
            service: UpstreamService::Business,
            status: 503,
            body: "maintenance".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "business service returned status 503: maintenance"
        );
    }
}
