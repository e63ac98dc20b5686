//! Renders a `ValidationOutcome` as a six-section human-readable report:
//! Objective, Input Parameters, Rules Applied, Calculation, Result, and
//! Issues Found (with a recommendation per category). None of this
//! changes what was decided — it only narrates it (§4.8).

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::capacity;
use crate::catalogue::RuleCatalogue;
use crate::domain::{DeploymentRequest, PlacementPlan, PodRequirement, ValidationOutcome};
use crate::enrich;
use crate::validators::meta;

pub fn explain(request: &DeploymentRequest, outcome: &ValidationOutcome, catalogue: &RuleCatalogue) -> String {
    let enriched = enrich::enrich(request, catalogue);
    let mut report = String::new();

    write_objective(&mut report, request);
    write_input_parameters(&mut report, request);
    write_rules_applied(&mut report, request, catalogue);
    write_calculation(&mut report, request, &enriched, catalogue);
    write_result(&mut report, outcome);
    write_issues(&mut report, outcome);

    report
}

fn write_objective(out: &mut String, request: &DeploymentRequest) {
    let _ = writeln!(out, "== Objective ==");
    let _ = writeln!(
        out,
        "Determine whether flavour '{}' can be placed on the given {} server(s) for operator {}.",
        request.vdu_flavor_name,
        request.server_count(),
        request.operator
    );
    let _ = writeln!(out);
}

fn write_input_parameters(out: &mut String, request: &DeploymentRequest) {
    let _ = writeln!(out, "== Input Parameters ==");
    let _ = writeln!(out, "operator: {}", request.operator);
    let _ = writeln!(out, "flavour: {}", request.vdu_flavor_name);
    for (i, server) in request.servers.iter().enumerate() {
        let _ = writeln!(
            out,
            "server {}: pcores={} vcores={} sockets={}",
            i, server.pcores, server.vcores, server.sockets
        );
    }
    for pod in &request.pods {
        let _ = writeln!(out, "pod: {} vcores={} quantity={}", pod.kind, pod.vcores, pod.quantity);
    }
    let _ = writeln!(
        out,
        "flags: ha={} isu={} switch={} directx2={} vcu={} vcsr={}",
        request.flags.ha_enabled,
        request.flags.in_service_upgrade,
        request.flags.vdu_ru_switch_connection,
        request.flags.directx2_required,
        request.flags.vcu_deployment_required,
        request.flags.vcsr_deployment_required
    );
    let _ = writeln!(out);
}

fn write_rules_applied(out: &mut String, request: &DeploymentRequest, catalogue: &RuleCatalogue) {
    let _ = writeln!(out, "== Rules Applied ==");
    let mut rules = vec!["C1", "C2", "M1", "M3", "V1", "V2", "V3"];
    if request.flags.in_service_upgrade || request.flags.ha_enabled {
        rules.push("M2");
    }
    if request.flags.ha_enabled {
        rules.push("M4");
    }
    if request.operator == crate::domain::Operator::VOS {
        rules.extend(["O1", "O3"]);
        if request.flags.vcu_deployment_required {
            rules.push("O2");
        }
        if request.flags.directx2_required {
            rules.push("O4");
        }
        if request.flags.vcsr_deployment_required {
            rules.push("O5");
        }
    }
    for rule in &rules {
        let _ = writeln!(out, "- {}", rule);
    }
    for (category, count) in catalogue.rule_summary() {
        let _ = writeln!(out, "catalogue section '{}' contributes {} rule(s)", category, count);
    }
    let _ = writeln!(out);
}

fn write_calculation(out: &mut String, request: &DeploymentRequest, enriched: &[PodRequirement], catalogue: &RuleCatalogue) {
    let _ = writeln!(out, "== Calculation ==");
    let required: f64 = enriched.iter().map(PodRequirement::total_vcores).sum();
    let available = capacity::fleet_available(request, catalogue);
    let _ = writeln!(out, "total required vCores (enriched): {}", required);
    let _ = writeln!(out, "total available vCores (fleet): {}", available);
    for (server_idx, server) in request.servers.iter().enumerate() {
        let per_socket = crate::domain::socket::SocketCapacity::new(
            server.vcores_per_socket(),
            catalogue.caas_per_socket(request.operator),
            catalogue.shared_per_socket(request.operator),
        );
        let _ = writeln!(
            out,
            "server {} per-socket: total={} caas={} shared={} available={}",
            server_idx, per_socket.total_vcores, per_socket.caas, per_socket.shared, per_socket.available
        );
    }
    let _ = writeln!(out);
}

fn write_result(out: &mut String, outcome: &ValidationOutcome) {
    let _ = writeln!(out, "== Result ==");
    let _ = writeln!(out, "success: {}", outcome.success);
    let _ = writeln!(out, "message: {}", outcome.message);
    if let Some(ref plan) = outcome.plan {
        let _ = writeln!(out, "{}", metrics(plan));
    }
    let _ = writeln!(out);
}

fn write_issues(out: &mut String, outcome: &ValidationOutcome) {
    let _ = writeln!(out, "== Issues Found ==");
    if outcome.success {
        let _ = writeln!(out, "none");
        return;
    }
    for violation in deduplicate(&outcome.violated_rules) {
        let _ = writeln!(out, "- {}", violation);
        if let Some(tag) = meta::v2_categorize(std::slice::from_ref(&violation)).into_iter().next() {
            let _ = writeln!(out, "  {}", tag);
        }
        let _ = writeln!(out, "  recommendation: {}", recommendation_for(&violation));
    }
}

/// Per-socket utilization and per-pod-kind distribution, for the Result
/// section. Supplements §4.8's six sections with the numbers an operator
/// actually wants when a plan exists.
fn metrics(plan: &PlacementPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "deployment metrics:");
    for socket in plan.sockets() {
        let used = plan.used_vcores(socket);
        let pods = plan.pods_on(socket);
        let _ = writeln!(out, "  {}: {} vCores used across {} pod group(s)", socket, used, pods.len());
    }
    let mut by_kind: HashMap<_, (u32, f64)> = HashMap::new();
    for (_, pods) in plan.iter() {
        for pod in pods {
            let entry = by_kind.entry(pod.kind).or_insert((0, 0.0));
            entry.0 += pod.quantity;
            entry.1 += pod.total_vcores();
        }
    }
    let mut kinds: Vec<_> = by_kind.into_iter().collect();
    kinds.sort_by_key(|(kind, _)| *kind);
    for (kind, (quantity, vcores)) in kinds {
        let _ = writeln!(out, "  {}: {} instance(s), {} vCores", kind, quantity, vcores);
    }
    out
}

/// Collapses overlapping violations from different pipeline stages into
/// one line per failure family, keeping the most detailed wording and
/// dropping V2's debug-only category tags from the printed list.
fn deduplicate(violations: &[String]) -> Vec<String> {
    let mut order: Vec<&'static str> = Vec::new();
    let mut kept: HashMap<&'static str, String> = HashMap::new();
    for v in violations {
        if v.starts_with("V2:") {
            continue;
        }
        let bucket = bucket_of(v);
        let keep = match kept.get(bucket) {
            Some(existing) => v.len() > existing.len(),
            None => true,
        };
        if keep {
            if !order.contains(&bucket) {
                order.push(bucket);
            }
            kept.insert(bucket, v.clone());
        }
    }
    order.into_iter().filter_map(|b| kept.remove(b)).collect()
}

fn bucket_of(violation: &str) -> &'static str {
    let lower = violation.to_lowercase();
    if lower.contains("socket capacity constraint") {
        "socket-capacity"
    } else if violation.starts_with("C1") {
        "server-capacity"
    } else if lower.contains("rmp-dpp co-location") {
        "rmp-dpp-colocation"
    } else if lower.contains("rmp placement feasibility") {
        "rmp-feasibility"
    } else if violation.starts_with("M") {
        "mandatory-placement"
    } else if violation.starts_with("O") {
        "operator-specific"
    } else {
        "other"
    }
}

fn recommendation_for(violation: &str) -> &'static str {
    match bucket_of(violation) {
        "socket-capacity" | "server-capacity" => "Increase server or socket vCore capacity, or reduce pod vCore/quantity demand.",
        "rmp-dpp-colocation" => "Free enough vCores on a single socket to host the combined RMP and DPP demand.",
        "rmp-feasibility" => "Match the RMP instance count to the DPP instance count.",
        "mandatory-placement" => "Add more sockets (servers, or multi-socket servers) or relax the conflicting feature flag.",
        "operator-specific" => "Review the operator-specific pod rules for this flavour in the rule catalogue.",
        _ => "Review the violation details above.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeatureFlags, Operator, PodKind, PodRequirement, ServerConfig};

    fn catalogue() -> RuleCatalogue {
        let yaml = r#"
core_concepts:
  pod_types:
    mandatory_vdu_pods: {pods: [DPP, DIP, RMP, CMP, DMP, PMP]}
    optional_pods: {pods: [IPP, IIP, UPP, CSP, vCU, vCSR]}
capacity_calculation_rules:
  C3: {allocations: {VOS: 4, Verizon: 4, Boost: 0}}
  C4: {operator_specific: {VOS: {vcores: 2.0}, Verizon: {vcores: 1.0}, Boost: {vcores: 0.0, global_minimum: 1.0}}}
operator_specific_pod_rules:
  O2: {flavor_mapping: {all_other_flavors: {vcores: 18, vcu_type: tiny-dran}}}
  O3: {flavors: []}
  O5: {flavor: {}}
server_configuration_rules:
  S1: {configurations: {}}
rule_categories: {capacity: [C1, C2, C3, C4], mandatory: [M1, M2, M3, M4]}
search_keys: {}
"#;
        serde_yaml::from_str(yaml).unwrap()
    }

    fn request() -> DeploymentRequest {
        DeploymentRequest {
            operator: Operator::VOS,
            vdu_flavor_name: "medium-regular-gnr-t20".to_string(),
            pods: vec![PodRequirement::new(PodKind::Dpp, 24.0, 1)],
            servers: vec![ServerConfig::new(16, 32, 1, None)],
            flags: FeatureFlags::default(),
            number_of_servers: None,
        }
    }

    #[test]
    fn report_contains_all_six_section_headers() {
        let outcome = ValidationOutcome::failure(vec!["C1: server capacity exceeded (required 10 > available 5)".to_string()], None);
        let report = explain(&request(), &outcome, &catalogue());
        for header in ["Objective", "Input Parameters", "Rules Applied", "Calculation", "Result", "Issues Found"] {
            assert!(report.contains(header), "missing section: {}", header);
        }
    }

    #[test]
    fn deduplicate_keeps_longest_per_bucket_and_drops_v2() {
        let violations = vec![
            "C1: server 0 capacity exceeded (required 10 > available 5)".to_string(),
            "C1: capacity exceeded".to_string(),
            "V2:CAPACITY: C1: capacity exceeded".to_string(),
        ];
        let deduped = deduplicate(&violations);
        assert_eq!(deduped.len(), 1);
        assert!(deduped[0].contains("required 10 > available 5"));
    }

    #[test]
    fn success_has_no_issues() {
        let outcome = ValidationOutcome::success(PlacementPlan::new());
        let report = explain(&request(), &outcome, &catalogue());
        assert!(report.contains("none"));
    }
}
