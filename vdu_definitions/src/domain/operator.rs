use std::fmt;

/// Network operator identity.
///
/// Selects which CaaS/shared reservation applies (see `catalogue::RuleCatalogue`)
/// and which operator-specific rules (O1-O5) are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    VOS,
    Verizon,
    Boost,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Operator::VOS => "VOS",
            Operator::Verizon => "Verizon",
            Operator::Boost => "Boost",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
