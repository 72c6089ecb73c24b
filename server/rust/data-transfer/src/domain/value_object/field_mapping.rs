use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// FieldMapping は取り込み先フィールドと CSV カラムの対応表を表す。
/// キーが対象フィールド名、値がソースカラム名。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping(BTreeMap<String, String>);

impl FieldMapping {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, target_field: &str) -> Option<&str> {
        self.0.get(target_field).map(String::as_str)
    }

    /// キーまたは値が空白のみのエントリを含むかどうかを返す。
    pub fn has_blank_entries(&self) -> bool {
        self.0
            .iter()
            .any(|(k, v)| k.trim().is_empty() || v.trim().is_empty())
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        )
    }

    pub fn from_json(value: serde_json::Value) -> anyhow::Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| anyhow::anyhow!("invalid field mapping: {}", e))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_entries_detected() {
        let mapping: FieldMapping = [("sku", "SKU"), ("name", " ")].into_iter().collect();
        assert!(mapping.has_blank_entries());

        let mapping: FieldMapping = [("sku", "SKU")].into_iter().collect();
        assert!(!mapping.has_blank_entries());
    }

    #[test]
    fn test_json_conversion() {
        let mapping: FieldMapping = [("sku", "SKU"), ("price", "Price")].into_iter().collect();
        let json = mapping.to_json();
        assert_eq!(json, serde_json::json!({"sku": "SKU", "price": "Price"}));

        let restored = FieldMapping::from_json(json).unwrap();
        assert_eq!(restored, mapping);
    }

    #[test]
    fn test_from_json_rejects_non_string_values() {
        let result = FieldMapping::from_json(serde_json::json!({"sku": 1}));
        assert!(result.is_err());
    }
}
