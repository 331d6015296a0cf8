//! GraphQL invocation and response classification
//!
//! Prerendering executes queries without a network hop: each operation is
//! wrapped in the event a serverless GraphQL function expects and handed
//! to a handler resolved from the host project's configuration.

pub mod classify;
mod command;
pub mod envelope;
mod fixtures;
pub mod handler;
mod http;
pub mod invoker;
pub mod operation;

pub use classify::classify;
pub use command::CommandHandler;
pub use envelope::{EnvelopeTemplate, HandlerResponse, InvocationContext, InvocationEvent};
pub use fixtures::FixtureHandler;
pub use handler::{ConfiguredLoader, GraphQLHandler, HandlerLoader, StaticLoader};
pub use http::HttpHandler;
pub use invoker::GraphQLInvoker;
pub use operation::{display_name, operation_name};
