//! Gateway Module
//!
//! The ordered access-control pipeline that fronts the static site.
//!
//! # Stages
//! 1. Embedding policy - frame headers on every response
//! 2. Geography - country allow-list, fail-open when unknown
//! 3. Automated client - user-agent blocklist
//! 4. Origin control - referer gate for non-public paths

mod pipeline;
mod policy;
mod stage;
mod stages;


pub use pipeline::{decorate_responses, enforce_access, Pipeline};
pub use policy::{AccessPolicy, DEFAULT_ALLOWED_ORIGIN, DEFAULT_COUNTRY_HEADER, UNKNOWN_COUNTRY};
pub use stage::{RequestMeta, Stage, Verdict};
pub use stages::{AutomatedClientStage, EmbeddingPolicyStage, GeographyStage, OriginControlStage};
