//! M1-M4: mandatory-pod presence and placement-shape rules, evaluated
//! against the enriched request and the computed plan.

use crate::domain::{DeploymentRequest, PlacementPlan, PodKind, PodRequirement};

/// M1 — the mandatory pod set is a subset of the enriched pods' kinds.
pub fn m1_mandatory_pods_present(enriched: &[PodRequirement]) -> Vec<String> {
    PodKind::MANDATORY
        .iter()
        .filter(|kind| !enriched.iter().any(|p| p.kind == **kind))
        .map(|kind| format!("M1: mandatory pod {} is missing from the deployment request", kind))
        .collect()
}

/// M2 — DPP placement shape depends on the active feature flags.
pub fn m2_dpp_placement(request: &DeploymentRequest, plan: &PlacementPlan) -> Vec<String> {
    let mut errors = Vec::new();
    let hosting: Vec<_> = plan.sockets().filter(|s| plan.pods_on(s).iter().any(|p| p.kind == PodKind::Dpp)).collect();

    if request.flags.in_service_upgrade {
        for socket in &hosting {
            let count = plan.pods_on(socket).iter().filter(|p| p.kind == PodKind::Dpp).count();
            if count > 1 {
                errors.push(format!("M2: {} hosts {} DPP instances, at most one is allowed under in-service upgrade", socket, count));
            }
        }
    } else if !request.flags.ha_enabled {
        for socket in &hosting {
            let count: u32 = plan.pods_on(socket).iter().filter(|p| p.kind == PodKind::Dpp).map(|p| p.quantity).sum();
            if count != 1 {
                errors.push(format!("M2: {} hosts {} DPP instances, exactly one is required", socket, count));
            }
        }
    }
    errors
}

/// M3 — RMP placement: one total in switch mode, otherwise paired with DPP by socket.
pub fn m3_rmp_placement(request: &DeploymentRequest, plan: &PlacementPlan) -> Vec<String> {
    let rmp_total = plan.count_of(PodKind::Rmp);
    if request.flags.vdu_ru_switch_connection {
        if rmp_total != 1 {
            return vec![format!("M3: switch mode requires exactly one RMP total, found {}", rmp_total)];
        }
        return Vec::new();
    }

    let dpp_total = plan.count_of(PodKind::Dpp);
    if rmp_total != dpp_total {
        return vec![format!(
            "M3: RMP count ({}) must equal DPP count ({}) outside switch mode",
            rmp_total, dpp_total
        )];
    }

    let mut errors = Vec::new();
    for socket in plan.sockets() {
        let dpp_here = plan.pods_on(socket).iter().filter(|p| p.kind == PodKind::Dpp).count();
        let rmp_here = plan.pods_on(socket).iter().filter(|p| p.kind == PodKind::Rmp).count();
        if dpp_here > 0 && rmp_here == 0 {
            errors.push(format!("M3: {} hosts DPP without a paired RMP", socket));
        }
    }
    errors
}

/// M4 — HA CMP placement: exactly two instances, on two distinct sockets.
pub fn m4_cmp_placement(request: &DeploymentRequest, plan: &PlacementPlan) -> Vec<String> {
    if !request.flags.ha_enabled {
        return Vec::new();
    }
    let hosting = plan.sockets_hosting(PodKind::Cmp);
    let total = plan.count_of(PodKind::Cmp);
    if total != 2 || hosting.len() != 2 {
        return vec![format!(
            "M4: ha_enabled requires exactly two CMP instances on two distinct sockets, found {} instance(s) on {} socket(s)",
            total,
            hosting.len()
        )];
    }
    Vec::new()
}
