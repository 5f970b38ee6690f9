pub mod auth;
pub mod dashboard_service;
pub mod finance_service;
pub mod form_flow;
pub mod lease_service;
pub mod listing;
pub mod metrics;
pub mod property_service;
pub mod rollups;
