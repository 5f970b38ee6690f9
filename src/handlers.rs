pub mod auth;
pub mod dashboard;
pub mod flows;
pub mod leases;
pub mod managers;
pub mod payments;
pub mod properties;
