pub mod auth;
pub mod dashboard;
pub mod lease;
pub mod manager;
pub mod payment;
pub mod property;
pub mod flow;
