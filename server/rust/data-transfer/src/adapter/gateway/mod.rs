pub mod connection_tester;

pub use connection_tester::StorageConnectionTester;
