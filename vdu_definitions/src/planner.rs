//! Assigns enriched pods to sockets. Pods are decomposed into disjoint
//! strata and placed in a fixed order so that, given the same enriched
//! request, the plan (and any placement violation) is bit-for-bit
//! reproducible (§5 ordering guarantees).

use std::collections::HashMap;

use crate::capacity;
use crate::catalogue::RuleCatalogue;
use crate::domain::{DeploymentRequest, Operator, PlacedPod, PlacementPlan, PodKind, PodRequirement, SocketCapacity, SocketId};

/// Result of a placement attempt. Only Step-0 infeasibility is fatal; any
/// other shortfall still yields a best-effort plan alongside the
/// violations describing what could not be seated.
pub enum PlanOutcome {
    Fatal(Vec<String>),
    Complete(PlacementPlan),
    Partial(PlacementPlan, Vec<String>),
}

#[derive(Debug, Clone, Copy)]
struct PodUnit {
    kind: PodKind,
    vcores: f64,
}

const DIRECTX2_KINDS: [PodKind; 3] = [PodKind::Ipp, PodKind::Csp, PodKind::Upp];

pub fn plan(request: &DeploymentRequest, enriched: &[PodRequirement], catalogue: &RuleCatalogue) -> PlanOutcome {
    let sockets = capacity::all_sockets(request, catalogue);
    let total_sockets = sockets.len();
    let mut available: HashMap<SocketId, f64> = sockets.iter().map(|(id, cap)| (*id, cap.available)).collect();
    let mut used: HashMap<SocketId, f64> = sockets.iter().map(|(id, _)| (*id, 0.0)).collect();

    let dpp_count: usize = enriched.iter().filter(|p| p.kind == PodKind::Dpp).map(|p| p.quantity as usize).sum();
    let cmp_count: usize = enriched.iter().filter(|p| p.kind == PodKind::Cmp).map(|p| p.quantity as usize).sum();

    let mut required_sockets = 0;
    if request.flags.in_service_upgrade {
        required_sockets = required_sockets.max(dpp_count);
    }
    if request.flags.ha_enabled {
        required_sockets = required_sockets.max(cmp_count.max(2));
    }
    if required_sockets > total_sockets {
        return PlanOutcome::Fatal(vec![format!(
            "anti-affinity infeasible: need {} sockets, have {}",
            required_sockets, total_sockets
        )]);
    }

    let mut remaining = expand_units(enriched);
    let mut plan = PlacementPlan::new();
    let mut violations = Vec::new();

    // Step 1: anti-affinity strata (DPP under in_service_upgrade, CMP under ha_enabled).
    let mut dpp_sockets = Vec::new();
    if request.flags.in_service_upgrade {
        match place_anti_affinity(PodKind::Dpp, &sockets, &mut remaining, &mut available, &mut used, &mut plan) {
            Ok(placed) => dpp_sockets = placed,
            Err(e) => violations.push(e),
        }
    }
    if request.flags.ha_enabled {
        if let Err(e) = place_anti_affinity(PodKind::Cmp, &sockets, &mut remaining, &mut available, &mut used, &mut plan) {
            violations.push(e);
        }
    }

    // Step 1b: RMP paired one-to-one with anti-affinity-placed DPP (normal mode only).
    if !request.flags.vdu_ru_switch_connection && !dpp_sockets.is_empty() {
        let rmp_vcores = enriched.iter().find(|p| p.kind == PodKind::Rmp).map(|p| p.vcores);
        if let Some(rmp_vcores) = rmp_vcores {
            remaining.retain(|u| u.kind != PodKind::Rmp);
            for socket in &dpp_sockets {
                let cap = available[socket];
                if used[socket] + rmp_vcores > cap {
                    violations.push(format!(
                        "placement failed: RMP ({} vCores) paired with DPP does not fit on {}",
                        rmp_vcores, socket
                    ));
                    continue;
                }
                *used.get_mut(socket).unwrap() += rmp_vcores;
                plan.place(*socket, PlacedPod { kind: PodKind::Rmp, vcores: rmp_vcores, quantity: 1 });
            }
        }
    }

    // Step 2: DirectX2 co-location — all of IPP/CSP/UPP land together on the
    // first socket with room for the combined demand.
    if request.flags.directx2_required {
        let group_indices: Vec<usize> = remaining
            .iter()
            .enumerate()
            .filter(|(_, u)| DIRECTX2_KINDS.contains(&u.kind))
            .map(|(i, _)| i)
            .collect();
        let combined: f64 = group_indices.iter().map(|&i| remaining[i].vcores).sum();
        let chosen = sockets.iter().map(|(id, _)| *id).find(|id| used[id] + combined <= available[id]);
        match chosen {
            Some(socket) => {
                let mut units: Vec<PodUnit> = group_indices.iter().map(|&i| remaining[i]).collect();
                let mut idx = 0;
                remaining.retain(|_| {
                    let keep = !group_indices.contains(&idx);
                    idx += 1;
                    keep
                });
                units.sort_by_key(|u| DIRECTX2_KINDS.iter().position(|k| *k == u.kind));
                for unit in units {
                    *used.get_mut(&socket).unwrap() += unit.vcores;
                    plan.place(socket, PlacedPod { kind: unit.kind, vcores: unit.vcores, quantity: 1 });
                }
            }
            None => violations.push(format!(
                "O4: DirectX2 co-location placement failed: no socket can host the combined IPP+CSP+UPP demand of {} vCores",
                combined
            )),
        }
    }

    // Not itemised as its own step in §4.5, but §4.5's step 2b needs IPP's
    // server already known: when DirectX2 didn't place it, seat the single
    // IPP now via plain first-fit before separating IIP from it.
    if let Some(pos) = remaining.iter().position(|u| u.kind == PodKind::Ipp) {
        let unit = remaining[pos];
        if let Some(socket) = sockets.iter().map(|(id, _)| *id).find(|id| used[id] + unit.vcores <= available[id]) {
            remaining.remove(pos);
            *used.get_mut(&socket).unwrap() += unit.vcores;
            plan.place(socket, PlacedPod { kind: unit.kind, vcores: unit.vcores, quantity: 1 });
        }
    }

    // Step 2b: IIP server separation (VOS, multi-server).
    if request.operator == Operator::VOS && request.server_count() > 1 {
        let ipp_server = plan.sockets_hosting(PodKind::Ipp).first().map(|s| s.server_index);
        let iip_indices: Vec<usize> = remaining.iter().enumerate().filter(|(_, u)| u.kind == PodKind::Iip).map(|(i, _)| i).collect();
        for &idx in iip_indices.iter().rev() {
            let unit = remaining[idx];
            let target = sockets
                .iter()
                .map(|(id, _)| *id)
                .find(|id| Some(id.server_index) != ipp_server && used[id] + unit.vcores <= available[id]);
            match target {
                Some(socket) => {
                    remaining.remove(idx);
                    *used.get_mut(&socket).unwrap() += unit.vcores;
                    plan.place(socket, PlacedPod { kind: unit.kind, vcores: unit.vcores, quantity: 1 });
                }
                None => violations.push(
                    "O1: IIP placement failed: no socket on a server other than the IPP-hosting server has capacity".to_string(),
                ),
            }
        }
    }

    // Step 3: non-RMP residuals, first-fit, canonical socket order.
    sweep_place(&sockets, &mut remaining, &mut available, &mut used, &mut plan, |u| u.kind != PodKind::Rmp);

    // Step 4: RMP residuals — co-located with DPP unless switch mode relaxes it.
    let dpp_hosting = plan.sockets_hosting(PodKind::Dpp);
    let rmp_candidates: Vec<(SocketId, SocketCapacity)> = if request.flags.vdu_ru_switch_connection {
        sockets.clone()
    } else {
        sockets.iter().filter(|(id, _)| dpp_hosting.contains(id)).cloned().collect()
    };
    sweep_place(&rmp_candidates, &mut remaining, &mut available, &mut used, &mut plan, |u| u.kind == PodKind::Rmp);

    if !remaining.is_empty() {
        let names: Vec<String> = remaining.iter().map(|u| u.kind.to_string()).collect();
        let capacities: Vec<String> = sockets.iter().map(|(id, _)| format!("{}: {:.1} remaining", id, available[id] - used[id])).collect();
        violations.push(format!(
            "placement failed: {} pod(s) could not be placed ({}); final socket capacities: [{}]",
            remaining.len(),
            names.join(", "),
            capacities.join(", ")
        ));
    }

    if violations.is_empty() {
        PlanOutcome::Complete(plan)
    } else {
        PlanOutcome::Partial(plan, violations)
    }
}

fn expand_units(enriched: &[PodRequirement]) -> Vec<PodUnit> {
    enriched
        .iter()
        .flat_map(|p| std::iter::repeat(PodUnit { kind: p.kind, vcores: p.vcores }).take(p.quantity as usize))
        .collect()
}

/// Expands one anti-affinity kind into per-instance units and assigns each
/// a distinct socket round-robin in canonical order, failing on the first
/// instance that does not fit.
fn place_anti_affinity(
    kind: PodKind,
    sockets: &[(SocketId, SocketCapacity)],
    remaining: &mut Vec<PodUnit>,
    available: &mut HashMap<SocketId, f64>,
    used: &mut HashMap<SocketId, f64>,
    plan: &mut PlacementPlan,
) -> Result<Vec<SocketId>, String> {
    let indices: Vec<usize> = remaining.iter().enumerate().filter(|(_, u)| u.kind == kind).map(|(i, _)| i).collect();
    let mut placed_sockets = Vec::new();
    for (instance, &idx) in indices.iter().enumerate() {
        let unit = remaining[idx];
        let socket = sockets[instance % sockets.len()].0;
        if used[&socket] + unit.vcores > available[&socket] {
            return Err(format!(
                "placement failed: {} instance could not be anti-affinity-placed on {} (insufficient capacity)",
                kind, socket
            ));
        }
        *used.get_mut(&socket).unwrap() += unit.vcores;
        plan.place(socket, PlacedPod { kind: unit.kind, vcores: unit.vcores, quantity: 1 });
        placed_sockets.push(socket);
    }
    let mut idx = 0;
    remaining.retain(|_| {
        let keep = !indices.contains(&idx);
        idx += 1;
        keep
    });
    Ok(placed_sockets)
}

/// Repeatedly scans sockets in canonical order, placing the first matching
/// remaining unit that fits, until no socket can absorb anything more.
fn sweep_place(
    sockets: &[(SocketId, SocketCapacity)],
    remaining: &mut Vec<PodUnit>,
    available: &mut HashMap<SocketId, f64>,
    used: &mut HashMap<SocketId, f64>,
    plan: &mut PlacementPlan,
    matches: impl Fn(&PodUnit) -> bool,
) {
    let mut progress = true;
    while progress {
        progress = false;
        for (socket, _) in sockets {
            loop {
                let found = remaining.iter().position(|u| matches(u) && used[socket] + u.vcores <= available[socket]);
                match found {
                    Some(pos) => {
                        let unit = remaining.remove(pos);
                        *used.get_mut(socket).unwrap() += unit.vcores;
                        plan.place(*socket, PlacedPod { kind: unit.kind, vcores: unit.vcores, quantity: 1 });
                        progress = true;
                    }
                    None => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeatureFlags, ServerConfig};

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
rule_categories: {}
search_keys: {}
"#;
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn ha_without_enough_sockets_is_fatal() {
        let cat = catalogue();
        let mut req = DeploymentRequest {
            operator: Operator::VOS,
            vdu_flavor_name: "medium-regular-spr-t23".to_string(),
            pods: vec![PodRequirement::new(PodKind::Cmp, 0.2, 2)],
            servers: vec![ServerConfig::new(32, 64, 1, None)],
            flags: FeatureFlags::default(),
            number_of_servers: None,
        };
        req.flags.ha_enabled = true;
        match plan(&req, &req.pods.clone(), &cat) {
            PlanOutcome::Fatal(violations) => {
                assert_eq!(violations, vec!["anti-affinity infeasible: need 2 sockets, have 1".to_string()]);
            }
            _ => panic!("expected fatal anti-affinity infeasibility"),
        }
    }

    #[test]
    fn dpp_and_rmp_pair_by_socket_under_in_service_upgrade() {
        let cat = catalogue();
        let mut req = DeploymentRequest {
            operator: Operator::Verizon,
            vdu_flavor_name: "x".to_string(),
            pods: vec![
                PodRequirement::new(PodKind::Dpp, 10.0, 2),
                PodRequirement::new(PodKind::Rmp, 0.5, 2),
            ],
            servers: vec![ServerConfig::new(96, 192, 2, None)],
            flags: FeatureFlags::default(),
            number_of_servers: None,
        };
        req.flags.in_service_upgrade = true;
        let enriched = req.pods.clone();
        match plan(&req, &enriched, &cat) {
            PlanOutcome::Complete(plan) => {
                for socket in plan.sockets_hosting(PodKind::Dpp) {
                    assert!(plan.pods_on(&socket).iter().any(|p| p.kind == PodKind::Rmp));
                }
            }
            PlanOutcome::Partial(_, violations) => panic!("unexpected violations: {:?}", violations),
            PlanOutcome::Fatal(violations) => panic!("unexpected fatal: {:?}", violations),
        }
    }
}
