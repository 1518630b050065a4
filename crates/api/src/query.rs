//! Shared query parameter types for API handlers.

use serde::Deserialize;

use gym_core::types::DbId;

/// Optional branch filter (`?branch_id=`).
///
/// Package listings match on client or coach branch; reports match on the
/// client's branch only.
#[derive(Debug, Default, Deserialize)]
pub struct BranchFilterParams {
    pub branch_id: Option<DbId>,
}

/// Query parameters for the sales report (`?branch_id=&debug=`).
#[derive(Debug, Default, Deserialize)]
pub struct SalesParams {
    pub branch_id: Option<DbId>,
    /// Return the matched rows per window instead of the sums.
    #[serde(default)]
    pub debug: bool,
}
