//! Terminal output for the CLI
//!
//! cliclack lines and spinners on an interactive terminal, bracketed plain lines
//! in CI and when piped.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{
    intro, outro_success, section, step_error_hint, step_ok_detail, step_skip, step_warn,
};
pub use progress::TaskSpinner;
