//! O1-O5: operator-specific pod cardinality, sizing, and co-location rules.
//! All are VOS-scoped except where noted; other operators pass through.

use crate::catalogue::RuleCatalogue;
use crate::domain::{DeploymentRequest, Operator, PlacementPlan, PodKind, PodRequirement};

/// O1 — VOS IPsec: exactly one IPP; IIP fan-out matches server separation.
pub fn o1_ipsec(request: &DeploymentRequest, plan: &PlacementPlan, catalogue: &RuleCatalogue) -> Vec<String> {
    if request.operator != Operator::VOS {
        return Vec::new();
    }
    let mut errors = Vec::new();

    let ipp_count = plan.count_of(PodKind::Ipp);
    if ipp_count != 1 {
        errors.push(format!("O1: exactly one IPP is required, found {}", ipp_count));
    }

    let iip_count = plan.count_of(PodKind::Iip);
    if request.server_count() > 1 {
        let servers_hosting_ipp = plan.sockets_hosting(PodKind::Ipp).iter().map(|s| s.server_index).collect::<std::collections::HashSet<_>>().len();
        let expected = request.server_count().saturating_sub(servers_hosting_ipp);
        if iip_count as usize != expected {
            errors.push(format!(
                "O1: expected {} IIP instance(s) on servers not hosting IPP, found {}",
                expected, iip_count
            ));
        }
        let ipp_servers: std::collections::HashSet<_> = plan.sockets_hosting(PodKind::Ipp).iter().map(|s| s.server_index).collect();
        for socket in plan.sockets_hosting(PodKind::Iip) {
            if ipp_servers.contains(&socket.server_index) {
                errors.push(format!("O1: {} hosts IIP but its server also hosts IPP", socket));
            }
        }
    } else if catalogue.is_special_flavor(&request.vdu_flavor_name) {
        if iip_count != 1 {
            errors.push(format!("O1: special flavour {} requires exactly one IIP, found {}", request.vdu_flavor_name, iip_count));
        }
    } else if iip_count != 0 {
        errors.push(format!("O1: non-special single-server flavour {} must not carry an IIP", request.vdu_flavor_name));
    }

    errors
}

/// O2 — vCU sizing, skipped unless requested and operator is VOS.
pub fn o2_vcu(request: &DeploymentRequest, enriched: &[PodRequirement], catalogue: &RuleCatalogue) -> Vec<String> {
    if request.operator != Operator::VOS || !request.flags.vcu_deployment_required {
        return Vec::new();
    }
    let (expected, _subkind) = catalogue.vcu_requirement(&request.vdu_flavor_name);
    match enriched.iter().find(|p| p.kind == PodKind::Vcu) {
        Some(pod) if pod.vcores != expected => {
            vec![format!("O2: vCU vCores ({}) must equal catalogue requirement ({}) for flavour {}", pod.vcores, expected, request.vdu_flavor_name)]
        }
        Some(_) => Vec::new(),
        None => vec!["O2: vCU deployment was required but no vCU pod is present".to_string()],
    }
}

/// O3 — special flavours must carry an IIP.
pub fn o3_special_flavor_iip(request: &DeploymentRequest, enriched: &[PodRequirement], catalogue: &RuleCatalogue) -> Vec<String> {
    if !catalogue.is_special_flavor(&request.vdu_flavor_name) {
        return Vec::new();
    }
    if enriched.iter().any(|p| p.kind == PodKind::Iip) {
        Vec::new()
    } else {
        vec![format!("O3: special flavour {} must carry an IIP", request.vdu_flavor_name)]
    }
}

/// O4 — DirectX2: IPP/CSP/UPP mandatory and co-located on one socket.
pub fn o4_directx2_colocation(request: &DeploymentRequest, plan: &PlacementPlan) -> Vec<String> {
    if request.operator != Operator::VOS || !request.flags.directx2_required {
        return Vec::new();
    }
    const REQUIRED: [PodKind; 3] = [PodKind::Ipp, PodKind::Csp, PodKind::Upp];
    let missing: Vec<_> = REQUIRED.iter().filter(|k| plan.count_of(**k) == 0).collect();
    if !missing.is_empty() {
        let names: Vec<_> = missing.iter().map(|k| k.to_string()).collect();
        return vec![format!("O4: DirectX2 requires {} but {} are missing from the plan", REQUIRED.iter().map(|k| k.to_string()).collect::<Vec<_>>().join("/"), names.join(", "))];
    }
    let sockets: std::collections::HashSet<_> = plan
        .sockets()
        .filter(|s| plan.pods_on(s).iter().any(|p| REQUIRED.contains(&p.kind)))
        .collect();
    if sockets.len() != 1 {
        return vec![format!("O4: IPP/CSP/UPP must share exactly one socket, found {} distinct socket(s)", sockets.len())];
    }
    Vec::new()
}

/// O5 — vCSR: flavour support and default server-config minimum.
pub fn o5_vcsr(request: &DeploymentRequest, enriched: &[PodRequirement], catalogue: &RuleCatalogue) -> Vec<String> {
    if request.operator != Operator::VOS || !request.flags.vcsr_deployment_required {
        return Vec::new();
    }
    let expected = match catalogue.vcsr_requirement(&request.vdu_flavor_name) {
        Some(v) => v,
        None => {
            return vec![format!("O5: flavour {} does not support vCSR deployment", request.vdu_flavor_name)];
        }
    };
    let mut errors = Vec::new();
    match enriched.iter().find(|p| p.kind == PodKind::Vcsr) {
        Some(pod) if pod.vcores != expected => {
            errors.push(format!("O5: vCSR vCores ({}) must equal catalogue requirement ({})", pod.vcores, expected));
        }
        Some(_) => {}
        None => errors.push("O5: vCSR deployment was required but no vCSR pod is present".to_string()),
    }
    if let Some(min) = catalogue.vcsr_default_server_config(&request.vdu_flavor_name) {
        let meets_minimum = request.servers.iter().any(|s| s.pcores >= min.pcores && s.sockets >= min.sockets);
        if !meets_minimum {
            errors.push(format!(
                "O5: no server meets the default vCSR minimum (pcores >= {}, sockets >= {})",
                min.pcores, min.sockets
            ));
        }
    }
    errors
}
