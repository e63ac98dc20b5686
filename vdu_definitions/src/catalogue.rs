use std::collections::HashMap;
use std::fmt::{self, Display};
use std::fs;
use std::path::Path;

use failure::{Backtrace, Context, Fail, ResultExt};
use serde_yaml::Value;

use crate::domain::{Operator, PodKind, ServerConfig};
use crate::Result;

const REQUIRED_SECTIONS: &[&str] = &[
    "core_concepts",
    "capacity_calculation_rules",
    "operator_specific_pod_rules",
    "server_configuration_rules",
    "rule_categories",
    "search_keys",
];

const SHARED_FLOOR: f64 = 1.0;

#[derive(Debug)]
struct CatalogueError {
    inner: Context<CatErrKind>,
}

#[derive(Clone, Eq, PartialEq, Debug, Fail)]
enum CatErrKind {
    #[fail(display = "could not read rule catalogue at '{}'", _0)]
    Unreadable(String),

    #[fail(display = "rule catalogue is missing required section(s): {}", _0)]
    MissingSections(String),

    #[fail(display = "rule catalogue at '{}' is not valid YAML", _0)]
    Malformed(String),
}

impl Fail for CatalogueError {
    fn cause(&self) -> Option<&dyn Fail> { self.inner.cause() }
    fn backtrace(&self) -> Option<&Backtrace> { self.inner.backtrace() }
}
impl Display for CatalogueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(&self.inner, f)
    }
}
impl From<CatErrKind> for CatalogueError {
    fn from(kind: CatErrKind) -> CatalogueError {
        CatalogueError { inner: Context::new(kind) }
    }
}
impl From<Context<CatErrKind>> for CatalogueError {
    fn from(inner: Context<CatErrKind>) -> CatalogueError {
        CatalogueError { inner }
    }
}

#[derive(Debug, Deserialize)]
pub struct RuleCatalogue {
    core_concepts: CoreConcepts,
    capacity_calculation_rules: CapacityCalculationRules,
    operator_specific_pod_rules: OperatorSpecificPodRules,
    server_configuration_rules: ServerConfigurationRules,
    #[serde(default)]
    rule_categories: HashMap<String, Vec<String>>,
    #[serde(default)]
    search_keys: SearchKeys,
}

#[derive(Debug, Deserialize)]
struct CoreConcepts {
    pod_types: PodTypes,
}
#[derive(Debug, Deserialize)]
struct PodTypes {
    mandatory_vdu_pods: PodList,
    optional_pods: PodList,
}
#[derive(Debug, Deserialize)]
struct PodList {
    pods: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CapacityCalculationRules {
    #[serde(rename = "C3")]
    c3: C3Rule,
    #[serde(rename = "C4")]
    c4: C4Rule,
}
#[derive(Debug, Deserialize)]
struct C3Rule {
    allocations: HashMap<String, i64>,
}
#[derive(Debug, Deserialize)]
struct C4Rule {
    operator_specific: HashMap<String, C4OperatorEntry>,
}
#[derive(Debug, Deserialize)]
struct C4OperatorEntry {
    vcores: f64,
    #[serde(default)]
    #[allow(dead_code)]
    global_minimum: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OperatorSpecificPodRules {
    #[serde(rename = "O2")]
    o2: O2Rule,
    #[serde(rename = "O3")]
    o3: O3Rule,
    #[serde(rename = "O5")]
    o5: O5Rule,
}
#[derive(Debug, Deserialize)]
struct O2Rule {
    flavor_mapping: HashMap<String, O2FlavorEntry>,
}
#[derive(Debug, Deserialize)]
struct O2FlavorEntry {
    vcores: f64,
    vcu_type: String,
}
#[derive(Debug, Deserialize)]
struct O3Rule {
    flavors: Vec<String>,
}
#[derive(Debug, Deserialize)]
struct O5Rule {
    flavor: HashMap<String, O5FlavorEntry>,
}
#[derive(Debug, Clone, Deserialize)]
pub struct O5FlavorEntry {
    pub vcores: f64,
    pub default_server_config: DefaultServerConfig,
}
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultServerConfig {
    pub pcores: i64,
    pub sockets: u32,
    #[serde(default)]
    pub pcores_per_socket: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ServerConfigurationRules {
    #[serde(rename = "S1")]
    s1: S1Rule,
}
#[derive(Debug, Deserialize)]
struct S1Rule {
    configurations: HashMap<String, S1OperatorConfig>,
}
#[derive(Debug, Deserialize)]
struct S1OperatorConfig {
    options: Vec<ServerConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchKeys {
    #[serde(default)]
    by_operator: HashMap<String, Vec<String>>,
    #[serde(default)]
    by_feature: HashMap<String, Vec<String>>,
}

impl RuleCatalogue {
    /// Loads and self-validates a rule catalogue document. Fails fast and
    /// lists every missing top-level section at once, rather than the
    /// first one a naive struct deserialization would choke on.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<RuleCatalogue> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .context(CatErrKind::Unreadable(path.display().to_string()))?;

        let document: Value = serde_yaml::from_str(&raw)
            .context(CatErrKind::Malformed(path.display().to_string()))?;

        let missing = missing_sections(&document);
        if !missing.is_empty() {
            return Err(CatErrKind::MissingSections(missing.join(", ")).into());
        }

        let catalogue: RuleCatalogue = serde_yaml::from_value(document)
            .context(CatErrKind::Malformed(path.display().to_string()))?;
        info!("loaded rule catalogue from {}", path.display());
        Ok(catalogue)
    }

    pub fn caas_per_socket(&self, op: Operator) -> i64 {
        self.capacity_calculation_rules
            .c3
            .allocations
            .get(op.as_str())
            .copied()
            .unwrap_or_else(|| default_caas_per_socket(op))
    }

    pub fn shared_per_socket(&self, op: Operator) -> f64 {
        if op == Operator::Boost {
            warn!("Boost operator rules are declared incomplete in the source catalogue; applying the {} vCore shared-reservation floor", SHARED_FLOOR);
        }
        let value = self
            .capacity_calculation_rules
            .c4
            .operator_specific
            .get(op.as_str())
            .map(|entry| entry.vcores)
            .unwrap_or_else(|| default_shared_per_socket(op));
        value.max(SHARED_FLOOR)
    }

    pub fn vcu_requirement(&self, flavor: &str) -> (f64, String) {
        let mapping = &self.operator_specific_pod_rules.o2.flavor_mapping;
        match mapping.get(flavor).or_else(|| mapping.get("all_other_flavors")) {
            Some(entry) => (entry.vcores, entry.vcu_type.clone()),
            None => (18.0, "tiny-dran".to_string()),
        }
    }

    pub fn vcsr_requirement(&self, flavor: &str) -> Option<f64> {
        self.operator_specific_pod_rules.o5.flavor.get(flavor).map(|entry| entry.vcores)
    }

    pub fn vcsr_default_server_config(&self, flavor: &str) -> Option<&DefaultServerConfig> {
        self.operator_specific_pod_rules
            .o5
            .flavor
            .get(flavor)
            .map(|entry| &entry.default_server_config)
    }

    pub fn is_special_flavor(&self, flavor: &str) -> bool {
        self.operator_specific_pod_rules.o3.flavors.iter().any(|f| f == flavor)
    }

    pub fn supported_server_configs(&self, op: Operator) -> Vec<ServerConfig> {
        self.server_configuration_rules
            .s1
            .configurations
            .get(op.as_str())
            .map(|cfg| cfg.options.clone())
            .unwrap_or_default()
    }

    pub fn mandatory_pod_kinds(&self) -> Vec<PodKind> {
        self.core_concepts
            .pod_types
            .mandatory_vdu_pods
            .pods
            .iter()
            .filter_map(|name| PodKind::from_str(name))
            .collect()
    }

    pub fn optional_pod_kinds(&self) -> Vec<PodKind> {
        self.core_concepts
            .pod_types
            .optional_pods
            .pods
            .iter()
            .filter_map(|name| PodKind::from_str(name))
            .collect()
    }

    pub fn rules_for_operator(&self, op: Operator) -> Vec<String> {
        self.search_keys.by_operator.get(op.as_str()).cloned().unwrap_or_default()
    }

    pub fn rules_for_feature(&self, feature: &str) -> Vec<String> {
        self.search_keys.by_feature.get(feature).cloned().unwrap_or_default()
    }

    pub fn rule_summary(&self) -> Vec<(String, usize)> {
        let mut summary: Vec<(String, usize)> = self
            .rule_categories
            .iter()
            .map(|(category, rules)| (category.clone(), rules.len()))
            .collect();
        summary.sort();
        summary
    }
}

fn default_caas_per_socket(op: Operator) -> i64 {
    match op {
        Operator::VOS => 4,
        Operator::Verizon => 4,
        Operator::Boost => 0,
    }
}

fn default_shared_per_socket(op: Operator) -> f64 {
    match op {
        Operator::VOS => 2.0,
        Operator::Verizon => 1.0,
        Operator::Boost => 1.0,
    }
}

fn missing_sections(document: &Value) -> Vec<String> {
    REQUIRED_SECTIONS
        .iter()
        .filter(|section| document.get(section).is_none())
        .map(|section| section.to_string())
        .collect()
}
