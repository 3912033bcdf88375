//! Database abstraction layer.
//!
//! This module provides database access functionality:
//! - Read-only connection pool
//! - Statement execution behind the `ProfileExecutor` seam
//! - Type mappings
//! - Result shape normalization

pub mod executor;
pub mod normalize;
pub mod pool;
pub mod types;

pub use executor::{PoolExecutor, ProfileExecutor};
pub use normalize::{RowSet, normalize};
pub use pool::DbPool;
