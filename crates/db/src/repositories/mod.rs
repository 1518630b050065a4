//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Methods used inside a scheduling
//! transaction take `&mut PgConnection` instead so the caller owns the
//! transaction boundary.

pub mod branch_repo;
pub mod report_repo;
pub mod training_package_repo;
pub mod user_repo;

pub use branch_repo::BranchRepo;
pub use report_repo::ReportRepo;
pub use training_package_repo::TrainingPackageRepo;
pub use user_repo::UserRepo;
