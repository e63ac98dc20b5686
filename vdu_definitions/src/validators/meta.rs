//! V1-V3. V3 (input validation) lives on `DeploymentRequest::validate`,
//! since it runs before enrichment/placement and never touches a plan; V1
//! and V2 run last, over whatever the earlier stages accumulated.

/// V1 — success iff no other validator reported a violation. This rule
/// never contributes a message of its own; the orchestrator derives
/// overall success directly from the accumulated violation list.
pub fn v1_overall_success(violations: &[String]) -> bool {
    violations.is_empty()
}

/// V2 — re-categorises already-reported violations into a short
/// human-readable bucket tag, for the Explainer's benefit. Purely
/// additive commentary: it never changes whether the outcome succeeds.
pub fn v2_categorize(violations: &[String]) -> Vec<String> {
    violations.iter().filter_map(|v| categorize_one(v)).collect()
}

fn categorize_one(violation: &str) -> Option<String> {
    let lower = violation.to_lowercase();
    let category = if lower.contains("co-location") {
        "CO_LOCATION"
    } else if lower.contains("anti-affinity") {
        "ANTI_AFFINITY"
    } else if lower.contains("capacity") {
        "CAPACITY"
    } else if lower.contains("mandatory pod") {
        "MANDATORY_PODS"
    } else if violation.starts_with('O') {
        "OPERATOR_SPECIFIC"
    } else if violation.starts_with("C2") {
        "SERVER_CONFIG"
    } else {
        return None;
    };
    Some(format!("V2:{}: {}", category, violation))
}
