#![allow(renamed_and_removed_lints)]

extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
extern crate serde_yaml;

#[macro_use]
extern crate log;

#[macro_use]
extern crate failure;

extern crate vdu_definitions;

pub use vdu_definitions::Result;
use vdu_definitions::{DeploymentRequest, Engine, RuleCatalogue};

use std::fs;
use std::path::Path;

/// Loads the catalogue and request, runs the engine, and prints the
/// outcome as JSON. Exits non-zero (via `Err`) when the request fails
/// validation, so shell callers can branch on the command's status.
pub fn validate(rules_path: &str, request_path: &str) -> Result<()> {
    let catalogue = RuleCatalogue::load(rules_path)?;
    let request = load_request(request_path)?;
    let outcome = Engine::new(catalogue).validate(request);
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if outcome.success {
        Ok(())
    } else {
        bail!("deployment request failed validation: {}", outcome.message);
    }
}

/// Runs the engine and prints the six-section human-readable report
/// instead of raw JSON. Always exits zero: the report itself carries the
/// pass/fail verdict.
pub fn explain(rules_path: &str, request_path: &str) -> Result<()> {
    let catalogue = RuleCatalogue::load(rules_path)?;
    let request = load_request(request_path)?;
    let engine = Engine::new(catalogue);
    let outcome = engine.validate(request.clone());
    println!("{}", vdu_definitions::explain::explain(&request, &outcome, engine.catalogue()));
    Ok(())
}

/// Prints a summary of the loaded catalogue's rule sections, for sanity
/// checking a catalogue document without a deployment request on hand.
pub fn catalogue(rules_path: &str) -> Result<()> {
    let catalogue = RuleCatalogue::load(rules_path)?;
    for (category, count) in catalogue.rule_summary() {
        println!("{}: {} rule(s)", category, count);
    }
    Ok(())
}

fn load_request<P: AsRef<Path>>(path: P) -> Result<DeploymentRequest> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)?;
    let request = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&data)?
    } else {
        serde_yaml::from_str(&data)?
    };
    Ok(request)
}
