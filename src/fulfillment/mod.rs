//! Order-fulfillment formulation.
//!
//! Assigns every ordered unit to a (distribution center, carrier) channel at
//! minimum delivery and handling cost, subject to carrier capacity and DC
//! inventory.
//!
//! # Pipeline
//!
//! 1. [`validate`]: reject malformed input
//! 2. [`AssignmentUniverse::generate`]: enumerate unit-level assignments
//! 3. [`ModelBuilder::build`]: variables, constraints and objective
//! 4. [`SolveOrchestrator::solve`]: one backend call
//! 5. [`extract`]: structured [`FulfillmentOutput`]
//!
//! [`fulfill`] runs the whole pipeline. [`check()`] verifies an output
//! independently of the model.

mod batch;
mod builder;
mod check;
mod config;
mod extractor;
mod generator;
mod instance;
mod orchestrator;
mod types;
mod validation;

pub use batch::solve_all;
pub use builder::{FulfillmentModel, ModelBuilder};
pub use check::{check, DEFAULT_TOLERANCE};
pub use config::{FulfillmentConfig, DEFAULT_CARTON_UPPER_BOUND};
pub use extractor::{extract, SELECTION_THRESHOLD};
pub use generator::AssignmentUniverse;
pub use instance::InstanceConfig;
pub use orchestrator::{fulfill, fulfill_with, SolveOrchestrator};
pub use types::{
    Assignment, CarrierKey, CarrierTable, DistributionCenter, FulfillmentInput, FulfillmentOutput,
    Item, Statistics, Status,
};
pub use validation::{validate, ValidationError};
