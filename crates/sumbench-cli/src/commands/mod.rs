pub mod analyze;
pub mod check;
pub mod compare;
pub mod deps;
pub mod init;
pub mod list_models;
pub mod render;
pub mod stats;
pub mod summarize;
pub mod validate;
