/// Physical server shape: `pcores` split evenly into `sockets`, each giving
/// `vcores` worth of scheduling capacity at a 2:1 pCore:vCore ratio.
///
/// Construction never fails. `validate()` returns the V3 diagnostics for a
/// malformed shape; callers decide whether to act on them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub pcores: i64,
    pub vcores: i64,
    pub sockets: u32,
    #[serde(default)]
    pub pcores_per_socket: Option<i64>,
}

impl ServerConfig {
    pub fn new(pcores: i64, vcores: i64, sockets: u32, pcores_per_socket: Option<i64>) -> Self {
        // mirrors the source's __post_init__: when unset and multi-socket,
        // pcores_per_socket is derived rather than left absent.
        let pcores_per_socket = pcores_per_socket.or_else(|| {
            if sockets > 1 {
                Some(pcores / i64::from(sockets))
            } else {
                None
            }
        });
        ServerConfig { pcores, vcores, sockets, pcores_per_socket }
    }

    /// pCores backing a single socket, falling back to an even split.
    pub fn pcores_per_socket(&self) -> i64 {
        self.pcores_per_socket
            .unwrap_or_else(|| self.pcores / i64::from(self.sockets.max(1)))
    }

    /// vCores backing a single socket (integer division, per §4.3).
    pub fn vcores_per_socket(&self) -> i64 {
        self.vcores / i64::from(self.sockets.max(1))
    }

    /// V3 input-validation diagnostics for this server, tagged but not yet
    /// prefixed with an index (the caller supplies positional context).
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.pcores <= 0 {
            errors.push(format!("pcores must be > 0, got {}", self.pcores));
        }
        if self.vcores <= 0 {
            errors.push(format!("vcores must be > 0, got {}", self.vcores));
        }
        if self.sockets != 1 && self.sockets != 2 {
            errors.push(format!("sockets must be 1 or 2, got {}", self.sockets));
        }
        errors
    }

    /// C2: pCore/vCore conversion and, for multi-socket servers, the
    /// per-socket split arithmetic.
    pub fn validate_core_conversion(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.vcores != self.pcores * 2 {
            errors.push(format!(
                "C2: vcores ({}) must equal pcores ({}) * 2",
                self.vcores, self.pcores
            ));
        }
        if self.sockets > 1 {
            let pps = self.pcores_per_socket();
            if pps * i64::from(self.sockets) != self.pcores {
                errors.push(format!(
                    "C2: pcores_per_socket ({}) * sockets ({}) must equal pcores ({})",
                    pps, self.sockets, self.pcores
                ));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_computes_pcores_per_socket_when_multi_socket() {
        let s = ServerConfig::new(48, 96, 2, None);
        assert_eq!(s.pcores_per_socket(), 24);
    }

    #[test]
    fn single_socket_leaves_pcores_per_socket_unset() {
        let s = ServerConfig::new(16, 32, 1, None);
        assert_eq!(s.pcores_per_socket, None);
        assert_eq!(s.pcores_per_socket(), 16);
    }

    #[test]
    fn rejects_non_positive_cores() {
        let s = ServerConfig::new(0, 0, 1, None);
        let errs = s.validate();
        assert_eq!(errs.len(), 2);
    }

    #[test]
    fn rejects_three_sockets() {
        let s = ServerConfig::new(16, 32, 3, None);
        assert_eq!(s.validate().len(), 1);
    }

    #[test]
    fn core_conversion_checks_ratio() {
        let s = ServerConfig::new(16, 31, 1, None);
        assert_eq!(s.validate_core_conversion().len(), 1);
    }
}
