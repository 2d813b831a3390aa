use std::io::{BufRead, Write};

use autoclicker_core::error::Result;
use autoclicker_core::{
    ClickScheduler, ClickType, ClickerService, Config, ConfigFile, ControlRequest, ControlSurface,
    CoreError, Event, MouseButton, Point, PositionMode, SettingsSource,
};
use clap::Args;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Args)]
pub struct RunArgs {
    /// Log clicks instead of injecting them
    #[arg(long)]
    pub dry_run: bool,
    /// Start clicking immediately
    #[arg(long)]
    pub start: bool,
    /// Exit once the run completes or is stopped
    #[arg(long)]
    pub exit_on_complete: bool,
    /// Click interval in milliseconds
    #[arg(long, value_name = "MS")]
    pub interval: Option<u64>,
    /// Number of clicks (0 repeats until stopped)
    #[arg(long, value_name = "N")]
    pub count: Option<u64>,
    /// Mouse button: left, right or middle
    #[arg(long)]
    pub button: Option<MouseButton>,
    /// Double-click on every tick
    #[arg(long)]
    pub double: bool,
    /// Click at a fixed screen point instead of the cursor
    #[arg(long, value_name = "X,Y")]
    pub at: Option<Point>,
}

impl RunArgs {
    fn has_overrides(&self) -> bool {
        self.interval.is_some()
            || self.count.is_some()
            || self.button.is_some()
            || self.double
            || self.at.is_some()
    }

    fn apply(&self, config: &mut Config) {
        if let Some(interval) = self.interval {
            config.click.interval_ms = interval;
        }
        if let Some(count) = self.count {
            config.click.repeat_count = count;
        }
        if let Some(button) = self.button {
            config.click.button = button;
        }
        if self.double {
            config.click.click_type = ClickType::Double;
        }
        if let Some(point) = self.at {
            config.position.mode = PositionMode::FixedPoint;
            config.position.x = point.x;
            config.position.y = point.y;
        }
    }
}

pub fn run(args: RunArgs) -> Result<()> {
    let mut config = Config::load()?;
    let settings: Box<dyn SettingsSource> = if args.has_overrides() {
        args.apply(&mut config);
        Box::new(config.validated())
    } else {
        Box::new(ConfigFile::new(Config::default_path()?))
    };

    if args.exit_on_complete && settings.snapshot().click.is_unbounded() {
        return Err(CoreError::InvalidRequest(
            "--exit-on-complete needs a non-zero repeat count".into(),
        ));
    }

    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let surface = ControlSurface::new(
        ClickScheduler::new(super::input_port(args.dry_run)),
        settings,
        config.hotkey.clone(),
        event_tx,
    );
    let service = ClickerService::new(surface);

    if args.start && request_tx.send(ControlRequest::Start).is_err() {
        return Err(CoreError::Custom("clicker service is not accepting requests".into()));
    }
    let exit_requests = args.exit_on_complete.then(|| request_tx.clone());
    spawn_stdin_reader(request_tx, !args.exit_on_complete);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let (state, printed) = runtime.block_on(async {
        tokio::join!(service.run(request_rx), print_events(event_rx, exit_requests))
    });
    printed?;

    tracing::info!(summary = %state.summary(), "clicker exited");
    Ok(())
}

/// Feed stdin lines to the service from a plain thread. At end of input the
/// service is shut down unless something else decides when to exit.
fn spawn_stdin_reader(requests: UnboundedSender<ControlRequest>, shutdown_at_eof: bool) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(error = %e, "stdin read failed");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<ControlRequest>() {
                Ok(request) => {
                    if requests.send(request).is_err() {
                        return;
                    }
                }
                Err(e) => tracing::warn!(error = %e, "ignoring request"),
            }
        }
        if shutdown_at_eof {
            let _ = requests.send(ControlRequest::Shutdown);
        }
    });
}

/// Print each event as one JSON line. With `exit_requests`, the end of a run
/// shuts the service down.
async fn print_events(
    mut events: UnboundedReceiver<Event>,
    exit_requests: Option<UnboundedSender<ControlRequest>>,
) -> Result<()> {
    let mut stdout = std::io::stdout();
    while let Some(event) = events.recv().await {
        writeln!(stdout, "{}", serde_json::to_string(&event)?)?;
        stdout.flush()?;

        let run_ended = matches!(
            event,
            Event::RunCompleted { .. } | Event::ClickerStopped { .. }
        );
        if let (true, Some(requests)) = (run_ended, &exit_requests) {
            let _ = requests.send(ControlRequest::Shutdown);
        }
    }
    Ok(())
}
