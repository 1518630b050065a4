pub mod branch;
pub mod payment;
pub mod report;
pub mod schedule;
pub mod training_package;
pub mod user;
