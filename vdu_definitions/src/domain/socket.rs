use std::collections::BTreeMap;
use std::fmt;

use super::pod::PodKind;

/// Structured socket identity, totally ordered by `(server_index, socket_index)`.
///
/// The source encodes this as `server_index * 1000 + socket_index`; that
/// integer trick is not carried over (see spec design notes on socket
/// identity encoding) — field declaration order gives us the same ordering
/// for free via the derived `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SocketId {
    pub server_index: usize,
    pub socket_index: usize,
}

impl SocketId {
    pub fn new(server_index: usize, socket_index: usize) -> Self {
        SocketId { server_index, socket_index }
    }
}

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "server {} socket {}", self.server_index, self.socket_index)
    }
}

/// Usable vCore capacity of a single socket after CaaS and shared
/// reservations are withheld.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SocketCapacity {
    pub total_vcores: i64,
    pub caas: i64,
    pub shared: f64,
    pub available: f64,
}

impl SocketCapacity {
    pub fn new(total_vcores: i64, caas: i64, shared: f64) -> Self {
        let available = total_vcores as f64 - caas as f64 - shared;
        SocketCapacity { total_vcores, caas, shared, available }
    }
}

/// One assignment of a pod kind to a socket, carrying enough of the
/// original requirement to reconstruct utilisation and violation messages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedPod {
    pub kind: PodKind,
    pub vcores: f64,
    pub quantity: u32,
}

impl PlacedPod {
    pub fn total_vcores(&self) -> f64 {
        self.vcores * f64::from(self.quantity)
    }
}

/// The planner's output: every enriched pod assigned to a socket.
///
/// Owned exclusively by the planner until the orchestrator moves it into
/// the outcome (§3 lifecycle note).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacementPlan {
    assignments: BTreeMap<SocketId, Vec<PlacedPod>>,
}

impl PlacementPlan {
    pub fn new() -> Self {
        PlacementPlan { assignments: BTreeMap::new() }
    }

    pub fn place(&mut self, socket: SocketId, pod: PlacedPod) {
        self.assignments.entry(socket).or_insert_with(Vec::new).push(pod);
    }

    pub fn sockets(&self) -> impl Iterator<Item = &SocketId> {
        self.assignments.keys()
    }

    pub fn pods_on(&self, socket: &SocketId) -> &[PlacedPod] {
        self.assignments.get(socket).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn used_vcores(&self, socket: &SocketId) -> f64 {
        self.pods_on(socket).iter().map(PlacedPod::total_vcores).sum()
    }

    pub fn sockets_hosting(&self, kind: PodKind) -> Vec<SocketId> {
        self.assignments
            .iter()
            .filter(|(_, pods)| pods.iter().any(|p| p.kind == kind))
            .map(|(socket, _)| *socket)
            .collect()
    }

    pub fn count_of(&self, kind: PodKind) -> u32 {
        self.assignments
            .values()
            .flat_map(|pods| pods.iter())
            .filter(|p| p.kind == kind)
            .map(|p| p.quantity)
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SocketId, &Vec<PlacedPod>)> {
        self.assignments.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}
