//! Derives operator-mandated additions from the base request. VOS-only per
//! §4.4; other operators' base requirements are trusted as-is.

use crate::catalogue::RuleCatalogue;
use crate::domain::{DeploymentRequest, Operator, PodKind, PodRequirement};

const IPP_VCORES: f64 = 4.0;
const IIP_VCORES: f64 = 4.0;
const DIRECTX2_VCORES: f64 = 2.0;

/// Idempotent: running this again on its own output appends nothing new,
/// since every step is guarded by a presence check on the enriched kind.
pub fn enrich(request: &DeploymentRequest, catalogue: &RuleCatalogue) -> Vec<PodRequirement> {
    let mut pods = request.pods.clone();
    if request.operator != Operator::VOS {
        return pods;
    }

    if !has_kind(&pods, PodKind::Ipp) {
        pods.push(PodRequirement::new(PodKind::Ipp, IPP_VCORES, 1));
    }

    if !has_kind(&pods, PodKind::Iip) {
        if catalogue.is_special_flavor(&request.vdu_flavor_name) {
            pods.push(PodRequirement::new(PodKind::Iip, IIP_VCORES, 1));
        } else if request.server_count() > 1 {
            pods.push(PodRequirement::new(PodKind::Iip, IIP_VCORES, (request.server_count() - 1) as u32));
        }
    }

    if request.flags.vcu_deployment_required && !has_kind(&pods, PodKind::Vcu) {
        let (vcores, _subkind) = catalogue.vcu_requirement(&request.vdu_flavor_name);
        pods.push(PodRequirement::new(PodKind::Vcu, vcores, 1));
    }

    if request.flags.directx2_required {
        if !has_kind(&pods, PodKind::Csp) {
            pods.push(PodRequirement::new(PodKind::Csp, DIRECTX2_VCORES, 1));
        }
        if !has_kind(&pods, PodKind::Upp) {
            pods.push(PodRequirement::new(PodKind::Upp, DIRECTX2_VCORES, 1));
        }
    }

    if request.flags.vcsr_deployment_required && !has_kind(&pods, PodKind::Vcsr) {
        if let Some(vcores) = catalogue.vcsr_requirement(&request.vdu_flavor_name) {
            pods.push(PodRequirement::new(PodKind::Vcsr, vcores, 1));
        }
        // else: unsupported flavor, left unplaced; O5 reports it.
    }

    // Not itemised in the source's enrichment table, but required for M4/S3:
    // HA mode needs two distinct CMP instances to anti-affinity-place, so a
    // lone CMP line item is topped up to quantity 2 rather than left for M4
    // to reject outright.
    if request.flags.ha_enabled {
        let cmp_total: u32 = pods.iter().filter(|p| p.kind == PodKind::Cmp).map(|p| p.quantity).sum();
        if cmp_total > 0 && cmp_total < 2 {
            if let Some(entry) = pods.iter_mut().find(|p| p.kind == PodKind::Cmp) {
                entry.quantity = 2;
            }
        }
    }

    pods
}

fn has_kind(pods: &[PodRequirement], kind: PodKind) -> bool {
    pods.iter().any(|p| p.kind == kind)
}
