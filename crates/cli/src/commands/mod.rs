pub mod build;
pub mod ingest;
pub mod init;
pub mod status;
