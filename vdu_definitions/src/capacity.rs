//! C1-C4 arithmetic: pCore/vCore conversion, per-socket usable capacity
//! after CaaS and shared reservations, and the pre-placement feasibility
//! checks that the planner would otherwise discover the hard way.

use crate::catalogue::RuleCatalogue;
use crate::domain::{DeploymentRequest, Operator, PodKind, PodRequirement, ServerConfig, SocketCapacity, SocketId};

pub fn socket_capacity(server: &ServerConfig, catalogue: &RuleCatalogue, op: Operator) -> SocketCapacity {
    SocketCapacity::new(
        server.vcores_per_socket(),
        catalogue.caas_per_socket(op),
        catalogue.shared_per_socket(op),
    )
}

pub fn server_available(server: &ServerConfig, catalogue: &RuleCatalogue, op: Operator) -> f64 {
    socket_capacity(server, catalogue, op).available * f64::from(server.sockets)
}

pub fn fleet_available(request: &DeploymentRequest, catalogue: &RuleCatalogue) -> f64 {
    request.servers.iter().map(|s| server_available(s, catalogue, request.operator)).sum()
}

/// Every socket of every server, in canonical `(server_index, socket_index)`
/// order, paired with its usable capacity.
pub fn all_sockets(request: &DeploymentRequest, catalogue: &RuleCatalogue) -> Vec<(SocketId, SocketCapacity)> {
    let mut sockets = Vec::new();
    for (server_idx, server) in request.servers.iter().enumerate() {
        let cap = socket_capacity(server, catalogue, request.operator);
        for socket_idx in 0..server.sockets as usize {
            sockets.push((SocketId::new(server_idx, socket_idx), cap));
        }
    }
    sockets
}

/// C2 — pCore/vCore conversion, per server.
pub fn validate_core_conversion(request: &DeploymentRequest) -> Vec<String> {
    let mut errors = Vec::new();
    for (idx, server) in request.servers.iter().enumerate() {
        for err in server.validate_core_conversion() {
            errors.push(format!("{} (server {})", err, idx));
        }
    }
    errors
}

/// C1 — total capacity: sum of all enriched pod vCore requests must not
/// exceed each server's own available capacity, checked independently per
/// server (§4.3 — deliberately not a fleet-wide sum).
pub fn validate_total_capacity(request: &DeploymentRequest, enriched: &[PodRequirement], catalogue: &RuleCatalogue) -> Vec<String> {
    let required: f64 = enriched.iter().map(PodRequirement::total_vcores).sum();
    let mut errors = Vec::new();
    for (idx, server) in request.servers.iter().enumerate() {
        let available = server_available(server, catalogue, request.operator);
        if required > available {
            errors.push(format!(
                "C1: server {} capacity exceeded (required {} > available {})",
                idx, required, available
            ));
        }
    }
    errors
}

/// Socket-feasibility pre-check (C1 extension): a single pod's block of
/// `vcores * quantity` must fit on at least one socket in the fleet.
pub fn validate_socket_feasibility(request: &DeploymentRequest, enriched: &[PodRequirement], catalogue: &RuleCatalogue) -> Vec<String> {
    let sockets = all_sockets(request, catalogue);
    let max_available = sockets.iter().map(|(_, cap)| cap.available).fold(0.0_f64, f64::max);

    let mut errors = Vec::new();
    for pod in enriched {
        if pod.is_zero() {
            continue;
        }
        let needed = pod.total_vcores();
        let fits_somewhere = sockets.iter().any(|(_, cap)| cap.available >= needed);
        if !fits_somewhere {
            errors.push(format!(
                "socket capacity constraint violated: {} ({} vCores) exceeds maximum socket capacity ({} vCores) - cannot fit on any socket",
                pod.kind, needed, max_available
            ));
        }
    }
    errors
}

/// RMP-DPP co-location pre-check: in normal (non-switch) mode the combined
/// RMP+DPP demand must fit together on at least one socket.
pub fn validate_rmp_dpp_colocation(request: &DeploymentRequest, enriched: &[PodRequirement], catalogue: &RuleCatalogue) -> Vec<String> {
    if request.flags.vdu_ru_switch_connection {
        return Vec::new();
    }
    let combined: f64 = enriched
        .iter()
        .filter(|p| p.kind == PodKind::Rmp || p.kind == PodKind::Dpp)
        .map(PodRequirement::total_vcores)
        .sum();
    if combined == 0.0 {
        return Vec::new();
    }
    let sockets = all_sockets(request, catalogue);
    if sockets.iter().any(|(_, cap)| cap.available >= combined) {
        return Vec::new();
    }

    let mut message = format!(
        "RMP-DPP co-location constraint violated: combined RMP+DPP demand ({} vCores) does not fit on any single socket",
        combined
    );
    for (socket, cap) in &sockets {
        let shortfall = combined - cap.available;
        if shortfall > 0.0 {
            message.push_str(&format!("; {} short by {} vCores", socket, shortfall));
        }
    }
    vec![message]
}

/// RMP placement-feasibility pre-check: M3's pairing requirement needs at
/// least as many DPP-capable sockets as RMP instances once anti-affinity
/// has claimed its share; this is a coarse pre-check ahead of the planner.
pub fn validate_rmp_placement_feasibility(request: &DeploymentRequest, enriched: &[PodRequirement]) -> Vec<String> {
    if request.flags.vdu_ru_switch_connection {
        return Vec::new();
    }
    let dpp_count: u32 = enriched.iter().filter(|p| p.kind == PodKind::Dpp).map(|p| p.quantity).sum();
    let rmp_count: u32 = enriched.iter().filter(|p| p.kind == PodKind::Rmp).map(|p| p.quantity).sum();
    if dpp_count != rmp_count {
        return vec![format!(
            "RMP placement feasibility violated: {} RMP instance(s) cannot be paired one-to-one with {} DPP instance(s)",
            rmp_count, dpp_count
        )];
    }
    Vec::new()
}
