use serde::{Deserialize, Serialize};

/// FileSource はジョブの元ファイルの所在を表す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileSource {
    /// ファイルサーバーへアップロード済みのファイル
    Upload { file_id: String, file_name: String },
    /// 設定済みのオブジェクトストレージ上のオブジェクト
    ObjectStorage { bucket: String, key: String },
    /// 設定済みの SFTP サーバー上のパス
    Sftp { path: String },
}

impl FileSource {
    pub fn kind(&self) -> &'static str {
        match self {
            FileSource::Upload { .. } => "upload",
            FileSource::ObjectStorage { .. } => "object_storage",
            FileSource::Sftp { .. } => "sftp",
        }
    }

    /// 必須項目がすべて埋まっているかどうかを返す。
    pub fn is_complete(&self) -> bool {
        match self {
            FileSource::Upload { file_id, file_name } => {
                !file_id.trim().is_empty() && !file_name.trim().is_empty()
            }
            FileSource::ObjectStorage { bucket, key } => {
                !bucket.trim().is_empty() && !key.trim().is_empty()
            }
            FileSource::Sftp { path } => !path.trim().is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_tagged() {
        let json = serde_json::json!({"type": "sftp", "path": "/in/products.csv"});
        let source: FileSource = serde_json::from_value(json).unwrap();
        assert_eq!(
            source,
            FileSource::Sftp {
                path: "/in/products.csv".to_string()
            }
        );
        assert_eq!(source.kind(), "sftp");
    }

    #[test]
    fn test_is_complete() {
        let upload = FileSource::Upload {
            file_id: "file_001".to_string(),
            file_name: "products.csv".to_string(),
        };
        assert!(upload.is_complete());

        let object = FileSource::ObjectStorage {
            bucket: "imports".to_string(),
            key: "".to_string(),
        };
        assert!(!object.is_complete());
    }
}
