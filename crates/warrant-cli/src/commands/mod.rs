pub mod adc;
pub mod company_did;
pub mod employee_credential;
pub mod health;
pub mod init_delegator;
pub mod retrieve;
pub mod store;

/// Default API endpoint of a local node.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000";
