#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Problem Details (RFC 9457) shared by every HTTP surface of the settings service.

pub mod context;
pub mod problem;

pub use context::{REQUEST_ID_HEADER, RequestContext};
pub use problem::{APPLICATION_PROBLEM_JSON, FieldViolation, Problem};
