/// Feature toggles that change which placement and operator rules apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub ha_enabled: bool,
    pub in_service_upgrade: bool,
    pub vdu_ru_switch_connection: bool,
    pub directx2_required: bool,
    pub vcu_deployment_required: bool,
    pub vcsr_deployment_required: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_all_disabled() {
        let flags = FeatureFlags::default();
        assert!(!flags.ha_enabled);
        assert!(!flags.in_service_upgrade);
        assert!(!flags.vdu_ru_switch_connection);
        assert!(!flags.directx2_required);
        assert!(!flags.vcu_deployment_required);
        assert!(!flags.vcsr_deployment_required);
    }
}
