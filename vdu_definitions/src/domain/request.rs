use serde::{Deserialize, Deserializer};
use serde::de::Error as DeError;
use serde_json::Value;

use super::flags::FeatureFlags;
use super::operator::Operator;
use super::pod::PodKind;
use super::server::ServerConfig;

/// One line item of the requested pod set.
///
/// `vcores = 0.0` is a valid, meaningful value: the catalogue uses it for
/// "not applicable in this cell" rows and for non-numeric source cells
/// (`nan`, `BE`) that parse to zero (§9 design notes) — such pods are
/// carried through but excluded from capacity arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PodRequirement {
    pub kind: PodKind,
    #[serde(deserialize_with = "deserialize_vcores")]
    pub vcores: f64,
    pub quantity: u32,
}

impl PodRequirement {
    pub fn new(kind: PodKind, vcores: f64, quantity: u32) -> Self {
        PodRequirement { kind, vcores, quantity }
    }

    /// Whether this line item is excluded from capacity arithmetic.
    pub fn is_zero(&self) -> bool {
        self.vcores == 0.0
    }

    pub fn total_vcores(&self) -> f64 {
        self.vcores * f64::from(self.quantity)
    }

    /// V3 diagnostics for this requirement alone.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.vcores < 0.0 {
            errors.push(format!(
                "V3: {} vcores must be >= 0, got {}",
                self.kind, self.vcores
            ));
        }
        if self.quantity < 1 {
            errors.push(format!(
                "V3: {} quantity must be >= 1, got {}",
                self.kind, self.quantity
            ));
        }
        errors
    }
}

/// Accepts numeric vCore cells as-is; non-numeric cells (`"nan"`, `"BE"`, or
/// any other text) parse to `0.0` rather than failing the document.
fn deserialize_vcores<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => return Err(DeError::custom("vcores must be a number or string")),
    };
    Ok(if parsed.is_finite() { parsed } else { 0.0 })
}

/// The request as submitted, before enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentRequest {
    pub operator: Operator,
    pub vdu_flavor_name: String,
    pub pods: Vec<PodRequirement>,
    pub servers: Vec<ServerConfig>,
    #[serde(default)]
    pub flags: FeatureFlags,
    #[serde(default)]
    pub number_of_servers: Option<usize>,
}

impl DeploymentRequest {
    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    pub fn has_pod_kind(&self, kind: PodKind) -> bool {
        self.pods.iter().any(|p| p.kind == kind)
    }

    pub fn quantity_of(&self, kind: PodKind) -> u32 {
        self.pods.iter().filter(|p| p.kind == kind).map(|p| p.quantity).sum()
    }

    /// V3: the full set of input-validation diagnostics for this request.
    ///
    /// A non-empty servers list is checked first and reported alone —
    /// per S6, an empty fleet is a single fatal diagnostic, not a cascade
    /// of "no socket could hold X" follow-ons.
    pub fn validate(&self) -> Vec<String> {
        if self.servers.is_empty() {
            return vec!["V3: server configuration not provided".to_string()];
        }

        let mut errors = Vec::new();
        for (idx, server) in self.servers.iter().enumerate() {
            for err in server.validate() {
                errors.push(format!("V3: server {} {}", idx, err));
            }
        }
        for pod in &self.pods {
            errors.extend(pod.validate());
        }
        if self.vdu_flavor_name.trim().is_empty() {
            errors.push("V3: vdu_flavor_name must not be empty".to_string());
        }
        if let Some(declared) = self.number_of_servers {
            if declared != self.servers.len() {
                errors.push(format!(
                    "V3: number_of_servers ({}) does not match server configuration count ({})",
                    declared,
                    self.servers.len()
                ));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> ServerConfig {
        ServerConfig::new(16, 32, 1, None)
    }

    #[test]
    fn empty_servers_is_the_only_diagnostic() {
        let req = DeploymentRequest {
            operator: Operator::VOS,
            vdu_flavor_name: "medium-regular-gnr-t20".to_string(),
            pods: vec![],
            servers: vec![],
            flags: FeatureFlags::default(),
            number_of_servers: None,
        };
        assert_eq!(req.validate(), vec!["V3: server configuration not provided".to_string()]);
    }

    #[test]
    fn rejects_negative_vcores_and_zero_quantity() {
        let req = DeploymentRequest {
            operator: Operator::VOS,
            vdu_flavor_name: "medium-regular-gnr-t20".to_string(),
            pods: vec![PodRequirement::new(PodKind::Dpp, -1.0, 0)],
            servers: vec![server()],
            flags: FeatureFlags::default(),
            number_of_servers: None,
        };
        let errors = req.validate();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn number_of_servers_mismatch_is_flagged() {
        let req = DeploymentRequest {
            operator: Operator::VOS,
            vdu_flavor_name: "medium-regular-gnr-t20".to_string(),
            pods: vec![],
            servers: vec![server()],
            flags: FeatureFlags::default(),
            number_of_servers: Some(2),
        };
        assert!(req.validate().iter().any(|e| e.contains("number_of_servers")));
    }

    #[test]
    fn zero_vcores_is_valid_and_excluded_from_arithmetic() {
        let pod = PodRequirement::new(PodKind::Ipp, 0.0, 1);
        assert!(pod.validate().is_empty());
        assert!(pod.is_zero());
    }
}
