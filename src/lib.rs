//! Core library for the roster-reconcile command line application.
//!
//! The library propagates a trusted value (a user's display name) from a
//! reference workbook into a target workbook keyed by login identifier. The
//! modules keep responsibilities narrow: workbook adapters live under
//! [`roster::reconcile::io`], the row model in [`roster::reconcile::model`],
//! header and key handling in [`roster::reconcile::columns`] and
//! [`roster::reconcile::normalize`], the join in [`roster::reconcile::merge`],
//! and the run orchestration under [`roster::reconcile::sync`].

pub mod roster;

pub use roster::reconcile::{
    ReconcileError, Result, backup, columns, config, error, io, merge, model, normalize, report,
    sync,
};
