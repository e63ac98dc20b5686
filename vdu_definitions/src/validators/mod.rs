//! M1-M4, O1-O5, V1-V2 — pure functions over the enriched request and the
//! computed plan. V3 lives on `domain::request::DeploymentRequest`.

pub mod mandatory;
pub mod meta;
pub mod operator;
