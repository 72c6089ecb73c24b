#![cfg(feature = "db-tests")]

use sqlx::PgPool;
use uuid::Uuid;

use k1s0_data_transfer_server::adapter::repository::credential_store_postgres::CredentialStorePostgresRepository;
use k1s0_data_transfer_server::adapter::repository::job_item_postgres::JobItemPostgresRepository;
use k1s0_data_transfer_server::adapter::repository::mapping_template_postgres::MappingTemplatePostgresRepository;
use k1s0_data_transfer_server::domain::entity::{JobItem, MappingTemplate, NewJobItem};
use k1s0_data_transfer_server::domain::repository::{
    CredentialStore, JobItemFilter, JobItemRepository, MappingTemplateRepository,
};
use k1s0_data_transfer_server::domain::value_object::{FileSource, JobStatus, JobType};

// sqlx::test マクロ用。マイグレーションを自動適用する。
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

fn make_job(tenant: &str, job_type: JobType) -> JobItem {
    JobItem::new(NewJobItem {
        tenant_id: tenant.to_string(),
        collection_target: "products".to_string(),
        file_source: FileSource::ObjectStorage {
            bucket: "k1s0-imports".to_string(),
            key: "2026/products.csv".to_string(),
        },
        has_header: true,
        job_type,
        job_sub_type: "upsert".to_string(),
        mapping: [("sku", "SKU")].into_iter().collect(),
        mapping_id: None,
        created_by: "user-001".to_string(),
        name: "daily products".to_string(),
    })
}

async fn set_status(pool: &PgPool, id: Uuid, status: JobStatus) {
    sqlx::query("UPDATE data_transfer.job_items SET status = $1 WHERE id = $2")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await
        .unwrap();
}

#[sqlx::test(migrator = "MIGRATOR")]
async fn test_create_and_find_job(pool: PgPool) {
    let repo = JobItemPostgresRepository::new(pool);
    let job = make_job("tenant-abc", JobType::Import);
    repo.create(&job).await.unwrap();

    let found = repo.find_by_id("tenant-abc", job.id).await.unwrap().unwrap();
    assert_eq!(found.file_source, job.file_source);
    assert_eq!(found.mapping, job.mapping);
    assert_eq!(found.status, JobStatus::Pending);

    assert!(repo.find_by_id("tenant-xyz", job.id).await.unwrap().is_none());
}

#[sqlx::test(migrator = "MIGRATOR")]
async fn test_find_all_filters_by_type(pool: PgPool) {
    let repo = JobItemPostgresRepository::new(pool);
    for job_type in [JobType::Import, JobType::Import, JobType::Export] {
        repo.create(&make_job("tenant-abc", job_type)).await.unwrap();
    }
    repo.create(&make_job("tenant-xyz", JobType::Import)).await.unwrap();

    let filter = JobItemFilter {
        job_type: Some(JobType::Import),
        status: None,
    };
    let (jobs, total) = repo.find_all("tenant-abc", &filter, 1, 1).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(total, 2);
}

#[sqlx::test(migrator = "MIGRATOR")]
async fn test_delete_skips_in_progress(pool: PgPool) {
    let repo = JobItemPostgresRepository::new(pool.clone());
    let job = make_job("tenant-abc", JobType::Import);
    repo.create(&job).await.unwrap();
    set_status(&pool, job.id, JobStatus::InProgress).await;

    assert!(!repo.delete_unless_in_progress("tenant-abc", job.id).await.unwrap());
    assert!(repo.find_by_id("tenant-abc", job.id).await.unwrap().is_some());

    set_status(&pool, job.id, JobStatus::Completed).await;
    assert!(repo.delete_unless_in_progress("tenant-abc", job.id).await.unwrap());
    assert!(repo.find_by_id("tenant-abc", job.id).await.unwrap().is_none());
}

#[sqlx::test(migrator = "MIGRATOR")]
async fn test_mapping_template_update(pool: PgPool) {
    let repo = MappingTemplatePostgresRepository::new(pool);
    let template = MappingTemplate::new(
        "tenant-abc".to_string(),
        "products default".to_string(),
        "products".to_string(),
        [("sku", "SKU")].into_iter().collect(),
        "user-001".to_string(),
    );
    repo.create(&template).await.unwrap();

    let replacement = [("sku", "Item Code")].into_iter().collect();
    assert!(repo
        .update_mapping("tenant-abc", template.id, &replacement)
        .await
        .unwrap());
    assert!(!repo
        .update_mapping("tenant-xyz", template.id, &replacement)
        .await
        .unwrap());

    let found = repo.find_by_id("tenant-abc", template.id).await.unwrap().unwrap();
    assert_eq!(found.mapping, replacement);

    let listed = repo
        .find_all("tenant-abc", Some("orders".to_string()))
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[sqlx::test(migrator = "MIGRATOR")]
async fn test_credential_store_upsert(pool: PgPool) {
    let store = CredentialStorePostgresRepository::new(pool);
    assert!(store.get("tenant-abc", "sftp").await.unwrap().is_none());

    store
        .set("tenant-abc", "sftp", &serde_json::json!({"host": "a"}), "admin-001")
        .await
        .unwrap();
    store
        .set("tenant-abc", "sftp", &serde_json::json!({"host": "b"}), "admin-002")
        .await
        .unwrap();

    let value = store.get("tenant-abc", "sftp").await.unwrap().unwrap();
    assert_eq!(value["host"], "b");
    assert!(store.get("tenant-xyz", "sftp").await.unwrap().is_none());
}
