use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Persisted hook data attached to a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookRecord {
    pub address: String,
    /// Hook type tag, e.g. `STABLE_SURGE`.
    pub hook_type: String,
    #[serde(default)]
    pub params: HookParams,
}

/// Dynamic hook parameters. Percentages are fractions (`0.01` is 1%).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HookParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_liquidity_fee_percentage: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_liquidity_fee_percentage: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap_fee_percentage: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amp: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surge_threshold_percentage: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_surge_fee_percentage: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_swap_fee_percentage: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_hook_record_params_default_when_absent() {
        let record: HookRecord =
            serde_json::from_str(r#"{"address": "0xhook", "hook_type": "LOTTERY"}"#).unwrap();
        assert_eq!(record.hook_type, "LOTTERY");
        assert_eq!(record.params, HookParams::default());
    }

    #[test]
    fn test_hook_params_skip_unset_fields() {
        let record = HookRecord {
            address: "0xhook".to_string(),
            hook_type: "EXIT_FEE".to_string(),
            params: HookParams {
                remove_liquidity_fee_percentage: Some(dec!(0.005)),
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        let params = json["params"].as_object().unwrap();
        assert_eq!(params.len(), 1);
        assert!(params.contains_key("remove_liquidity_fee_percentage"));
        let back: HookRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
