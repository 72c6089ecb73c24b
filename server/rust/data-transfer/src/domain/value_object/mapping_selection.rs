use uuid::Uuid;

/// クライアントが「保存済みマッピングを選択していない」ことを示すために送る mapping_id の値。
pub const NO_MAPPING_SELECTED: &str = "create";

/// MappingSelection はジョブ投入時にどの保存済みマッピングが選択されたかを表す。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingSelection {
    NoneSelected,
    Existing(Uuid),
}

impl MappingSelection {
    /// リクエストの mapping_id を解釈する。未指定と "create" は NoneSelected として扱う。
    pub fn parse(raw: Option<&str>) -> Result<Self, uuid::Error> {
        match raw.map(str::trim) {
            None | Some("") | Some(NO_MAPPING_SELECTED) => Ok(MappingSelection::NoneSelected),
            Some(id) => Uuid::parse_str(id).map(MappingSelection::Existing),
        }
    }
}

/// SaveMappingAction は既存マッピング選択時の保存方法を表す。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveMappingAction {
    #[default]
    None,
    Create,
    Update,
}

impl SaveMappingAction {
    /// リクエストの save_mapping_action を解釈する。
    /// "create" / "update" 以外（未指定・null・未知の値）は保存しない扱いになる。
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("create") => SaveMappingAction::Create,
            Some("update") => SaveMappingAction::Update,
            _ => SaveMappingAction::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sentinel_and_missing() {
        assert_eq!(
            MappingSelection::parse(Some("create")).unwrap(),
            MappingSelection::NoneSelected
        );
        assert_eq!(
            MappingSelection::parse(None).unwrap(),
            MappingSelection::NoneSelected
        );
    }

    #[test]
    fn test_parse_existing_id() {
        let id = Uuid::new_v4();
        let selection = MappingSelection::parse(Some(&id.to_string())).unwrap();
        assert_eq!(selection, MappingSelection::Existing(id));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(MappingSelection::parse(Some("m1")).is_err());
    }

    #[test]
    fn test_save_action_from_wire() {
        assert_eq!(SaveMappingAction::from_wire(Some("update")), SaveMappingAction::Update);
        assert_eq!(SaveMappingAction::from_wire(Some("create")), SaveMappingAction::Create);
        assert_eq!(SaveMappingAction::from_wire(Some("none")), SaveMappingAction::None);
        assert_eq!(SaveMappingAction::from_wire(Some("replace")), SaveMappingAction::None);
        assert_eq!(SaveMappingAction::from_wire(None), SaveMappingAction::None);
    }
}
