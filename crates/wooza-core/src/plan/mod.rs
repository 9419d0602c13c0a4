//! Plan catalogue operations.

pub mod error;
pub mod filter;
pub mod payload;
pub mod service;
pub mod validate;

pub use error::PlanError;
pub use filter::{FilterError, QueryParams, build_filter};
pub use payload::{PayloadError, PlanChanges, PlanPayload};
pub use service::PlanService;
pub use validate::{InvalidField, validate, validate_for_update};
