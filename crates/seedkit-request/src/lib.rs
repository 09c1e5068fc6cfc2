//! Seed request contracts and validation.
//!
//! Turns raw, already-parsed input into a validated [`SeedRequest`],
//! aggregating every problem into an [`ErrorList`] instead of failing fast.

pub mod errors;
pub mod model;
pub mod validate;

pub use errors::{ErrorList, IssueKind, SeedIssue};
pub use model::{ChannelOptions, SeedRequest};
pub use validate::{
    collect_field_options, collect_options, parse_schema_id, parse_seed_count, validate_field,
};
