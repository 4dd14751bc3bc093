//! Terminal output for the CLI
//!
//! Uses `cliclack` for spinners, steps, and prompts in interactive terminals,
//! with plain line output in CI and when piped.

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{key_value, step_error, step_ok, step_ok_detail, step_warn_hint};
pub use progress::TaskSpinner;
pub use prompts::confirm;
