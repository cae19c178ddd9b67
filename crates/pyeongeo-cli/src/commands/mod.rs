pub mod browse;
pub mod cache;
pub mod generate;
pub mod init;
pub mod list_models;
pub mod session;
pub mod validate;
