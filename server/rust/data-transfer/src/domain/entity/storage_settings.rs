//! 外部ストレージ（オブジェクトストレージ / SFTP）の接続設定。
//!
//! 設定は CredentialStore に JSON ブロブとして保存される。
//! 認証情報は SecretString で保持し、読み出し時はマスクした値のみを返す。

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// 読み出し時に秘密値の代わりに返す文字列。
/// 更新リクエストでこの値が送られた場合は保存済みの秘密値を維持する。
pub const MASKED_SECRET: &str = "********";

/// StorageSettings は CredentialStore に保存される型付き設定の共通インターフェース。
pub trait StorageSettings: Sized + Send + Sync {
    /// CredentialStore 上の設定名
    const KEY: &'static str;
    /// 秘密値のフィールド名（バリデーションエラーの報告に使用する）
    const SECRET_FIELD: &'static str;

    fn from_blob(blob: serde_json::Value) -> anyhow::Result<Self>;
    fn to_blob(&self) -> serde_json::Value;
    fn to_masked_json(&self) -> serde_json::Value;
    /// 必須項目の欠落・不正値のフィールド名一覧を返す。
    fn invalid_fields(&self) -> Vec<&'static str>;
    fn secret(&self) -> &SecretString;
    fn replace_secret(&mut self, secret: SecretString);

    fn has_masked_secret(&self) -> bool {
        self.secret().expose_secret() == MASKED_SECRET
    }
}

#[derive(Debug)]
pub struct ObjectStorageSettings {
    pub region: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: SecretString,
    /// S3 互換ストレージ（MinIO 等）を使う場合のエンドポイント
    pub endpoint: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct StoredObjectStorageSettings {
    region: String,
    bucket: String,
    access_key_id: String,
    secret_access_key: String,
    #[serde(default)]
    endpoint: Option<String>,
}

impl StorageSettings for ObjectStorageSettings {
    const KEY: &'static str = "object_storage";
    const SECRET_FIELD: &'static str = "secret_access_key";

    fn from_blob(blob: serde_json::Value) -> anyhow::Result<Self> {
        let stored: StoredObjectStorageSettings = serde_json::from_value(blob)
            .map_err(|e| anyhow::anyhow!("invalid object storage settings blob: {}", e))?;
        Ok(Self {
            region: stored.region,
            bucket: stored.bucket,
            access_key_id: stored.access_key_id,
            secret_access_key: SecretString::new(stored.secret_access_key),
            endpoint: stored.endpoint,
        })
    }

    fn to_blob(&self) -> serde_json::Value {
        serde_json::json!({
            "region": self.region,
            "bucket": self.bucket,
            "access_key_id": self.access_key_id,
            "secret_access_key": self.secret_access_key.expose_secret(),
            "endpoint": self.endpoint,
        })
    }

    fn to_masked_json(&self) -> serde_json::Value {
        serde_json::json!({
            "region": self.region,
            "bucket": self.bucket,
            "access_key_id": self.access_key_id,
            "secret_access_key": MASKED_SECRET,
            "endpoint": self.endpoint,
        })
    }

    fn invalid_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.region.trim().is_empty() {
            fields.push("region");
        }
        if self.bucket.trim().is_empty() {
            fields.push("bucket");
        }
        if self.access_key_id.trim().is_empty() {
            fields.push("access_key_id");
        }
        if self.secret_access_key.expose_secret().is_empty() {
            fields.push(Self::SECRET_FIELD);
        }
        if let Some(ref endpoint) = self.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                fields.push("endpoint");
            }
        }
        fields
    }

    fn secret(&self) -> &SecretString {
        &self.secret_access_key
    }

    fn replace_secret(&mut self, secret: SecretString) {
        self.secret_access_key = secret;
    }
}

fn default_sftp_port() -> u16 {
    22
}

fn default_root_path() -> String {
    "/".to_string()
}

#[derive(Debug)]
pub struct SftpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub root_path: String,
}

#[derive(Serialize, Deserialize)]
struct StoredSftpSettings {
    host: String,
    #[serde(default = "default_sftp_port")]
    port: u16,
    username: String,
    password: String,
    #[serde(default = "default_root_path")]
    root_path: String,
}

impl StorageSettings for SftpSettings {
    const KEY: &'static str = "sftp";
    const SECRET_FIELD: &'static str = "password";

    fn from_blob(blob: serde_json::Value) -> anyhow::Result<Self> {
        let stored: StoredSftpSettings = serde_json::from_value(blob)
            .map_err(|e| anyhow::anyhow!("invalid sftp settings blob: {}", e))?;
        Ok(Self {
            host: stored.host,
            port: stored.port,
            username: stored.username,
            password: SecretString::new(stored.password),
            root_path: stored.root_path,
        })
    }

    fn to_blob(&self) -> serde_json::Value {
        serde_json::json!({
            "host": self.host,
            "port": self.port,
            "username": self.username,
            "password": self.password.expose_secret(),
            "root_path": self.root_path,
        })
    }

    fn to_masked_json(&self) -> serde_json::Value {
        serde_json::json!({
            "host": self.host,
            "port": self.port,
            "username": self.username,
            "password": MASKED_SECRET,
            "root_path": self.root_path,
        })
    }

    fn invalid_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.host.trim().is_empty() {
            fields.push("host");
        }
        if self.port == 0 {
            fields.push("port");
        }
        if self.username.trim().is_empty() {
            fields.push("username");
        }
        if self.password.expose_secret().is_empty() {
            fields.push(Self::SECRET_FIELD);
        }
        if !self.root_path.starts_with('/') {
            fields.push("root_path");
        }
        fields
    }

    fn secret(&self) -> &SecretString {
        &self.password
    }

    fn replace_secret(&mut self, secret: SecretString) {
        self.password = secret;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_object_storage() -> ObjectStorageSettings {
        ObjectStorageSettings {
            region: "ap-northeast-1".to_string(),
            bucket: "k1s0-imports".to_string(),
            access_key_id: "AKIAEXAMPLE".to_string(),
            secret_access_key: SecretString::new("s3cret".to_string()),
            endpoint: None,
        }
    }

    #[test]
    fn test_object_storage_blob_round_trip_keeps_secret() {
        let settings = sample_object_storage();
        let restored = ObjectStorageSettings::from_blob(settings.to_blob()).unwrap();
        assert_eq!(restored.bucket, "k1s0-imports");
        assert_eq!(restored.secret_access_key.expose_secret(), "s3cret");
    }

    #[test]
    fn test_masked_json_hides_secret() {
        let json = sample_object_storage().to_masked_json();
        assert_eq!(json["secret_access_key"], MASKED_SECRET);
        assert!(!json.to_string().contains("s3cret"));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let debug = format!("{:?}", sample_object_storage());
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_object_storage_invalid_fields() {
        let settings = ObjectStorageSettings {
            region: "".to_string(),
            bucket: "b".to_string(),
            access_key_id: "".to_string(),
            secret_access_key: SecretString::new(String::new()),
            endpoint: Some("minio:9000".to_string()),
        };
        assert_eq!(
            settings.invalid_fields(),
            vec!["region", "access_key_id", "secret_access_key", "endpoint"]
        );
    }

    #[test]
    fn test_sftp_blob_defaults() {
        let blob = serde_json::json!({
            "host": "sftp.example.com",
            "username": "transfer",
            "password": "pw"
        });
        let settings = SftpSettings::from_blob(blob).unwrap();
        assert_eq!(settings.port, 22);
        assert_eq!(settings.root_path, "/");
        assert!(settings.invalid_fields().is_empty());
    }

    #[test]
    fn test_has_masked_secret() {
        let mut settings = sample_object_storage();
        assert!(!settings.has_masked_secret());
        settings.replace_secret(SecretString::new(MASKED_SECRET.to_string()));
        assert!(settings.has_masked_secret());
    }

    #[test]
    fn test_invalid_blob() {
        let result = SftpSettings::from_blob(serde_json::json!({"host": 1}));
        assert!(result.is_err());
    }
}
