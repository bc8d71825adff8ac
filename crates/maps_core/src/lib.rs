pub mod config;
pub mod coords;
pub mod error;
pub mod pipeline;
pub mod simulator;
pub mod upstream;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
