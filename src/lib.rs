//! Prerender - static HTML for GraphQL-backed pages
//!
//! Renders component trees to a fixpoint: every pass records the GraphQL
//! queries it needs, the queries run in-process against the project's
//! handler, and the tree is rendered again until nothing new is requested.

pub mod cache;
pub mod cli;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod graphql;
pub mod manifest;
pub mod output;
pub mod render;
pub mod report;
pub mod ui;

pub use engine::{EngineSettings, PrerenderEngine, RenderOutcome};
pub use error::{PrerenderError, PrerenderResult};
