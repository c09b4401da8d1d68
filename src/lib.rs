pub mod config;
pub mod coordinator;
pub mod decode;
pub mod fetch;
pub mod humanize;
pub mod input;
pub mod observability;
pub mod record;
pub mod resume;
pub mod sink;
