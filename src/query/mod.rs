//! Query composition.
//!
//! Tool criteria are turned into `QueryDescriptor`s by `builder`, then
//! rendered into parameterized statements for the configured dialect.

pub mod builder;
pub mod criteria;
pub mod descriptor;

pub use criteria::{
    AffiliatedInput, CreatorInput, GetProfileInput, HiringInput, LocationInput, OpenToWorkInput,
    RawQueryInput, SearchProfilesInput,
};
pub use descriptor::{
    Condition, DescriptorBuilder, Direction, Expr, Operator, OrderTerm, Predicate,
    QueryDescriptor,
};
