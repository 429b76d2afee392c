pub mod backup;
pub mod columns;
pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod report;
pub mod sync;

pub use error::{ReconcileError, Result};
