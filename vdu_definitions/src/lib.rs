#![allow(renamed_and_removed_lints)]

#[macro_use]
extern crate serde_derive;
extern crate serde;
extern crate serde_json;
extern crate serde_yaml;

#[macro_use]
extern crate log;

#[macro_use]
extern crate failure;

pub use failure::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Domain types: pods, servers, sockets, requests, outcomes.
pub mod domain;

/// Loads and queries the rule catalogue document.
pub mod catalogue;

/// C1-C4 capacity arithmetic.
pub mod capacity;

/// Deterministic requirement enrichment.
pub mod enrich;

/// Socket-level bin-packing placement search.
pub mod planner;

/// M1-M4, O1-O5, V1-V2 rule validators.
pub mod validators;

/// The fixed validation pipeline.
pub mod orchestrator;

/// Human-readable explanation report generation.
pub mod explain;

pub use catalogue::RuleCatalogue;
pub use domain::{DeploymentRequest, FeatureFlags, Operator, PlacementPlan, PodKind, PodRequirement, ServerConfig, ValidationOutcome};
pub use orchestrator::Engine;
