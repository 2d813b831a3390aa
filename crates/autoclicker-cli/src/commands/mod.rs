pub mod config;
pub mod position;
pub mod run;

use autoclicker_core::input;
use autoclicker_core::{DryRunInput, InputPort};

/// The native input port, or the dry-run port when asked for or when this
/// platform has no native binding.
pub fn input_port(dry_run: bool) -> Box<dyn InputPort + Send> {
    if dry_run {
        return Box::new(DryRunInput::default());
    }
    match input::native() {
        Ok(port) => port,
        Err(e) => {
            tracing::warn!(error = %e, "native input unavailable, using dry run");
            Box::new(DryRunInput::default())
        }
    }
}
