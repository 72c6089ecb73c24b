pub mod access_policy;
pub mod mapping_decision;

pub use mapping_decision::{decide, MappingDecisionError, MappingPersistence};
