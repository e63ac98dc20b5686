use super::socket::PlacementPlan;

/// The single channel rule violations flow through — never an exception.
///
/// `violated_rules` entries are pre-formatted as `"TAG: sentence"`, matching
/// the report's tag-prefixed convention (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub success: bool,
    pub message: String,
    pub violated_rules: Vec<String>,
    pub plan: Option<PlacementPlan>,
}

impl ValidationOutcome {
    pub fn success(plan: PlacementPlan) -> Self {
        ValidationOutcome {
            success: true,
            message: "deployment request is valid".to_string(),
            violated_rules: Vec::new(),
            plan: Some(plan),
        }
    }

    pub fn failure(violated_rules: Vec<String>, plan: Option<PlacementPlan>) -> Self {
        let message = violated_rules
            .first()
            .cloned()
            .unwrap_or_else(|| "deployment request is invalid".to_string());
        ValidationOutcome { success: false, message, violated_rules, plan }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_has_no_violations() {
        let outcome = ValidationOutcome::success(PlacementPlan::new());
        assert!(outcome.success);
        assert!(outcome.violated_rules.is_empty());
    }

    #[test]
    fn failure_message_is_first_violation() {
        let outcome = ValidationOutcome::failure(
            vec!["C1: server capacity exceeded".to_string()],
            None,
        );
        assert!(!outcome.success);
        assert_eq!(outcome.message, "C1: server capacity exceeded");
    }
}
