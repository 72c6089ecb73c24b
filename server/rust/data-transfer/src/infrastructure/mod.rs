pub mod config;
pub mod in_memory;
pub mod jwks_verifier;
pub mod logger;
pub mod metrics;
