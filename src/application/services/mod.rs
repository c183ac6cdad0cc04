pub mod dashboard_service;
pub mod ingestion_service;
