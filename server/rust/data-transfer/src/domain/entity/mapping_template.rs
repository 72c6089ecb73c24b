use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_object::FieldMapping;

/// MappingTemplate は再利用可能な名前付きフィールドマッピングを表す。
/// ジョブ投入の副作用としてのみ作成・更新される。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingTemplate {
    pub id: Uuid,
    pub tenant_id: String,
    pub name: String,
    pub collection_target: String,
    pub mapping: FieldMapping,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MappingTemplate {
    pub fn new(
        tenant_id: String,
        name: String,
        collection_target: String,
        mapping: FieldMapping,
        created_by: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            name,
            collection_target,
            mapping,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn replace_mapping(&mut self, mapping: FieldMapping) {
        self.mapping = mapping;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_template() {
        let t = MappingTemplate::new(
            "tenant-abc".to_string(),
            "products default".to_string(),
            "products".to_string(),
            [("sku", "SKU")].into_iter().collect(),
            "user-001".to_string(),
        );
        assert_eq!(t.name, "products default");
        assert_eq!(t.collection_target, "products");
        assert_eq!(t.created_at, t.updated_at);
    }

    #[test]
    fn test_replace_mapping_keeps_identity() {
        let mut t = MappingTemplate::new(
            "tenant-abc".to_string(),
            "products default".to_string(),
            "products".to_string(),
            [("sku", "SKU")].into_iter().collect(),
            "user-001".to_string(),
        );
        let id = t.id;
        t.replace_mapping([("sku", "SKU2")].into_iter().collect());

        assert_eq!(t.id, id);
        assert_eq!(t.mapping.get("sku"), Some("SKU2"));
        assert!(t.updated_at >= t.created_at);
    }
}
