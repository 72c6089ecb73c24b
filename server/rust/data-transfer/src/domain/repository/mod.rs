pub mod connection_tester;
pub mod credential_store;
pub mod job_item_repository;
pub mod mapping_template_repository;

pub use connection_tester::ConnectionTester;
pub use credential_store::CredentialStore;
pub use job_item_repository::{JobItemFilter, JobItemRepository};
pub use mapping_template_repository::MappingTemplateRepository;
