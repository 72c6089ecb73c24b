//! ジョブ投入時のマッピング保存方法の決定ロジック。
//!
//! | 選択            | フラグ                               | 結果                    |
//! |-----------------|--------------------------------------|-------------------------|
//! | NoneSelected    | should_save_to_new_mapping = true    | 新規マッピングを作成    |
//! | NoneSelected    | should_save_to_new_mapping = false   | 保存しない              |
//! | Existing(id)    | save_mapping_action = create         | 新規マッピングを作成    |
//! | Existing(id)    | save_mapping_action = update         | id のマッピングを更新   |
//! | Existing(id)    | save_mapping_action = none           | 保存しない              |

use uuid::Uuid;

use crate::domain::value_object::{MappingSelection, SaveMappingAction};

/// MappingPersistence はジョブ投入に伴うマッピングの永続化操作を表す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingPersistence {
    Skip,
    Insert { name: String },
    Update { mapping_id: Uuid },
}

impl MappingPersistence {
    /// メトリクスのラベル値。保存しない場合は None。
    pub fn label(&self) -> Option<&'static str> {
        match self {
            MappingPersistence::Skip => None,
            MappingPersistence::Insert { .. } => Some("insert"),
            MappingPersistence::Update { .. } => Some("update"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingDecisionError {
    #[error("new_mapping_name is required to save a new mapping")]
    MissingNewMappingName,
}

impl MappingDecisionError {
    pub fn field(&self) -> &'static str {
        match self {
            MappingDecisionError::MissingNewMappingName => "new_mapping_name",
        }
    }
}

/// マッピングの永続化操作を決定する。
/// should_save_to_new_mapping は NoneSelected のときのみ、save_action は Existing のときのみ参照する。
pub fn decide(
    selection: MappingSelection,
    save_action: SaveMappingAction,
    should_save_to_new_mapping: bool,
    new_mapping_name: Option<&str>,
) -> Result<MappingPersistence, MappingDecisionError> {
    let insert = || {
        new_mapping_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|n| MappingPersistence::Insert {
                name: n.to_string(),
            })
            .ok_or(MappingDecisionError::MissingNewMappingName)
    };

    match selection {
        MappingSelection::NoneSelected if should_save_to_new_mapping => insert(),
        MappingSelection::NoneSelected => Ok(MappingPersistence::Skip),
        MappingSelection::Existing(_) if save_action == SaveMappingAction::Create => insert(),
        MappingSelection::Existing(mapping_id) if save_action == SaveMappingAction::Update => {
            Ok(MappingPersistence::Update { mapping_id })
        }
        MappingSelection::Existing(_) => Ok(MappingPersistence::Skip),
    }
}
