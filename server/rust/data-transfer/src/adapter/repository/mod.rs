pub mod credential_store_postgres;
pub mod job_item_postgres;
pub mod mapping_template_postgres;
