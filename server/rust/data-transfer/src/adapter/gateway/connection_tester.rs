use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use secrecy::{ExposeSecret, SecretString};
use ssh2::Session;

use crate::domain::entity::{ObjectStorageSettings, SftpSettings};
use crate::domain::repository::ConnectionTester;

/// StorageConnectionTester は外部ストレージへの疎通を確認する。
/// オブジェクトストレージはバケットへの HeadBucket、SFTP は SSH 認証後にルートパスを stat できるかで判定する。
pub struct StorageConnectionTester {
    timeout: Duration,
}

impl StorageConnectionTester {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn s3_client(settings: &ObjectStorageSettings) -> aws_sdk_s3::Client {
        let credentials = Credentials::new(
            settings.access_key_id.clone(),
            settings.secret_access_key.expose_secret().clone(),
            None,
            None,
            "data-transfer-settings",
        );
        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials);
        if let Some(ref endpoint) = settings.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        aws_sdk_s3::Client::from_conf(builder.build())
    }
}

#[async_trait]
impl ConnectionTester for StorageConnectionTester {
    async fn test_object_storage(&self, settings: &ObjectStorageSettings) -> anyhow::Result<()> {
        let client = Self::s3_client(settings);
        let request = client.head_bucket().bucket(&settings.bucket).send();

        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(anyhow::anyhow!(
                "failed to access bucket {}: {}",
                settings.bucket,
                DisplayErrorContext(&e)
            )),
            Err(_) => Err(anyhow::anyhow!(
                "timed out after {}s while accessing bucket {}",
                self.timeout.as_secs(),
                settings.bucket
            )),
        }
    }

    async fn test_sftp(&self, settings: &SftpSettings) -> anyhow::Result<()> {
        let target = SftpTarget::from(settings);
        let addr = target.addr();
        let timeout = self.timeout;
        let session = tokio::task::spawn_blocking(move || target.open(timeout));

        match tokio::time::timeout(self.timeout, session).await {
            Ok(Ok(Ok(()))) => {
                tracing::debug!(addr = %addr, "sftp login succeeded");
                Ok(())
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(e)) => Err(anyhow::anyhow!("sftp check for {} aborted: {}", addr, e)),
            Err(_) => Err(anyhow::anyhow!(
                "timed out after {}s while connecting to {}",
                self.timeout.as_secs(),
                addr
            )),
        }
    }
}

/// SftpTarget はブロッキングタスクへ渡す SFTP 接続情報を表す。
struct SftpTarget {
    host: String,
    port: u16,
    username: String,
    password: SecretString,
    root_path: String,
}

impl From<&SftpSettings> for SftpTarget {
    fn from(settings: &SftpSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            username: settings.username.clone(),
            password: SecretString::new(settings.password.expose_secret().clone()),
            root_path: settings.root_path.clone(),
        }
    }
}

impl SftpTarget {
    fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 接続・鍵交換・パスワード認証を行い、ルートパスが参照できることを確認する。
    /// libssh2 はブロッキング API のため spawn_blocking 内で呼び出す。
    fn open(&self, timeout: Duration) -> anyhow::Result<()> {
        let addr = self.addr();
        let socket_addr = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| anyhow::anyhow!("failed to resolve {}: {}", addr, e))?
            .next()
            .ok_or_else(|| anyhow::anyhow!("failed to resolve {}", addr))?;
        let tcp = TcpStream::connect_timeout(&socket_addr, timeout)
            .map_err(|e| anyhow::anyhow!("failed to connect to {}: {}", addr, e))?;

        let mut session = Session::new()?;
        session.set_timeout(u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX));
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| anyhow::anyhow!("ssh handshake with {} failed: {}", addr, e))?;

        session
            .userauth_password(&self.username, self.password.expose_secret())
            .map_err(|e| {
                anyhow::anyhow!("authentication as {} on {} failed: {}", self.username, addr, e)
            })?;
        if !session.authenticated() {
            anyhow::bail!("authentication as {} on {} failed", self.username, addr);
        }

        let sftp = session
            .sftp()
            .map_err(|e| anyhow::anyhow!("failed to start sftp subsystem on {}: {}", addr, e))?;
        let stat = sftp
            .stat(Path::new(&self.root_path))
            .map_err(|e| anyhow::anyhow!("cannot access {} on {}: {}", self.root_path, addr, e))?;
        if !stat.is_dir() {
            anyhow::bail!("{} on {} is not a directory", self.root_path, addr);
        }
        Ok(())
    }
}
