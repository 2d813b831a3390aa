//! The clicker's event loop.
//!
//! One task owns the control surface and multiplexes host requests with timer
//! ticks. Requests are polled first, so a `stop` that is already queued wins
//! over a tick that became due at the same time, and once the timer has been
//! dropped no further tick can be observed.

use tokio::sync::mpsc::UnboundedReceiver;

use crate::control::{ControlRequest, ControlSurface, Flow};
use crate::input::InputPort;
use crate::scheduler::RunState;
use crate::storage::SettingsSource;

pub struct ClickerService<P, S> {
    surface: ControlSurface<P, S>,
}

impl<P: InputPort, S: SettingsSource> ClickerService<P, S> {
    pub fn new(surface: ControlSurface<P, S>) -> Self {
        Self { surface }
    }

    /// Serve requests until `shutdown` or until every sender is dropped.
    /// Any active run is stopped before returning the final state.
    pub async fn run(mut self, mut requests: UnboundedReceiver<ControlRequest>) -> RunState {
        tracing::info!("clicker service started");
        loop {
            tokio::select! {
                biased;

                request = requests.recv() => match request {
                    Some(request) => {
                        if self.surface.handle(request) == Flow::Shutdown {
                            tracing::info!("shutdown requested");
                            break;
                        }
                    }
                    None => {
                        tracing::debug!("request channel closed");
                        break;
                    }
                },
                _ = self.surface.next_tick() => self.surface.tick(),
            }
        }

        self.surface.stop();
        let state = self.surface.run_state();
        tracing::info!(click_count = state.click_count, "clicker service stopped");
        state
    }
}
