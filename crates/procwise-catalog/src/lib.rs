//! # procwise-catalog
//!
//! Procedure model and the immutable, loaded-once procedure catalog.
//!
//! A [`Procedure`] is a named, ordered (with limited branching) sequence of
//! [`Step`]s describing one guided business task, e.g. "submit invoice".
//! The [`ProcedureCatalog`] is loaded from a JSON configuration file at
//! startup and never mutated afterwards; loading failures degrade to an
//! empty catalog so the surrounding system stays up.

pub mod catalog;
pub mod error;
pub mod procedure;

pub use catalog::ProcedureCatalog;
pub use error::{CatalogError, CatalogResult};
pub use procedure::{Procedure, ProcedureInfo, Step, ValidationRule};
