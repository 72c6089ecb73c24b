#![cfg(feature = "sftp-tests")]

// 実 SFTP サーバーが必要。例:
//   docker run -p 2222:22 -d atmoz/sftp transfer:pw:::upload
//   SFTP_TEST_HOST=127.0.0.1 SFTP_TEST_PORT=2222 SFTP_TEST_USER=transfer \
//   SFTP_TEST_PASSWORD=pw SFTP_TEST_ROOT=/upload cargo test --features sftp-tests

use std::time::Duration;

use secrecy::SecretString;

use k1s0_data_transfer_server::adapter::gateway::StorageConnectionTester;
use k1s0_data_transfer_server::domain::entity::SftpSettings;
use k1s0_data_transfer_server::domain::repository::ConnectionTester;

fn env(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set"))
}

fn settings_from_env(password: &str) -> SftpSettings {
    SftpSettings {
        host: env("SFTP_TEST_HOST"),
        port: env("SFTP_TEST_PORT").parse().unwrap(),
        username: env("SFTP_TEST_USER"),
        password: SecretString::new(password.to_string()),
        root_path: std::env::var("SFTP_TEST_ROOT").unwrap_or_else(|_| "/".to_string()),
    }
}

fn tester() -> StorageConnectionTester {
    StorageConnectionTester::new(Duration::from_secs(10))
}

#[tokio::test]
async fn test_valid_credentials_succeed() {
    let settings = settings_from_env(&env("SFTP_TEST_PASSWORD"));
    tester().test_sftp(&settings).await.unwrap();
}

#[tokio::test]
async fn test_wrong_password_fails_authentication() {
    let wrong = format!("{}-wrong", env("SFTP_TEST_PASSWORD"));
    let err = tester()
        .test_sftp(&settings_from_env(&wrong))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("authentication"));
}

#[tokio::test]
async fn test_missing_root_path_fails() {
    let mut settings = settings_from_env(&env("SFTP_TEST_PASSWORD"));
    settings.root_path = "/no/such/directory".to_string();
    let err = tester().test_sftp(&settings).await.unwrap_err();
    assert!(err.to_string().contains("cannot access"));
}
