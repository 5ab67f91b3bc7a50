use indicatif::{HumanDuration, ProgressBar, ProgressDrawTarget, ProgressStyle};
use neemp::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 100;
const DISCARD_PHASE: &str = "Discarding";

/// What the terminal display has seen of the current run.
struct Display {
    bar: ProgressBar,
    phase: Option<&'static str>,
    /// Kappa scans finished within the current phase.
    scans: u64,
    last_status: Option<String>,
}

impl Display {
    fn start_phase(&mut self, name: &'static str) {
        self.phase = Some(name);
        self.scans = 0;
        self.bar.reset();
        self.bar.set_length(0);
        self.bar.set_prefix("");
        self.bar.set_style(spinner_style());
        self.bar.set_message(name);
        self.bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    }

    fn start_scan(&mut self, trials: u64) {
        let label = match self.phase {
            Some(DISCARD_PHASE) => format!("Candidate {}", self.scans + 1),
            _ => "Kappa scan".to_string(),
        };
        self.bar.disable_steady_tick();
        self.bar.set_style(scan_style());
        self.bar.set_prefix(label);
        self.bar.set_length(trials);
        self.bar.set_position(0);
        self.bar.reset_eta();
    }

    fn finish_scan(&mut self) {
        if let Some(length) = self.bar.length() {
            self.bar.set_position(length);
        }
        self.scans += 1;
        // Brent refinement and the next candidate run without a known length.
        self.bar.set_style(spinner_style());
        self.bar.set_message(match self.phase {
            Some(DISCARD_PHASE) => format!("{DISCARD_PHASE}: {} candidate(s) evaluated", self.scans),
            Some(name) => format!("{name}: refining"),
            None => "Refining".to_string(),
        });
        self.bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    }

    fn status(&mut self, line: String) {
        self.bar.println(format!("  {line}"));
        self.last_status = Some(line);
    }

    fn finish_phase(&mut self) {
        let name = self.phase.take().unwrap_or("Step");
        let took = HumanDuration(self.bar.elapsed());
        self.bar.disable_steady_tick();
        self.bar.set_style(spinner_style());
        self.bar.finish_with_message(format!("✓ {name} finished in {took}"));
    }
}

/// Draws engine [`Progress`] events on stderr: a spinner per phase and a bar
/// per kappa scan. Discard iterations are printed above the bar.
#[derive(Clone)]
pub struct CliProgressHandler {
    display: Arc<Mutex<Display>>,
}

impl CliProgressHandler {
    /// A handler for the terminal; draws nothing when `quiet` is set.
    pub fn new(quiet: bool) -> Self {
        let target = if quiet {
            ProgressDrawTarget::hidden()
        } else {
            ProgressDrawTarget::stderr()
        };
        let bar = ProgressBar::with_draw_target(Some(0), target).with_style(spinner_style());
        Self {
            display: Arc::new(Mutex::new(Display {
                bar,
                phase: None,
                scans: 0,
                last_status: None,
            })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let display = Arc::clone(&self.display);

        Box::new(move |event: Progress| {
            let Ok(mut display) = display.lock() else {
                warn!("Progress display mutex was poisoned, dropping event.");
                return;
            };
            match event {
                Progress::PhaseStart { name } => display.start_phase(name),
                Progress::TaskStart { total_steps } => display.start_scan(total_steps),
                Progress::TaskIncrement => display.bar.inc(1),
                Progress::TaskFinish => display.finish_scan(),
                Progress::Message(line) => display.status(line),
                Progress::PhaseFinish => display.finish_phase(),
            }
        })
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn scan_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:<14} [{bar:40.cyan/blue}] {pos}/{len} kappa values ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replay(handler: &CliProgressHandler, events: Vec<Progress>) {
        let callback = handler.get_callback();
        for event in events {
            callback(event);
        }
    }

    #[test]
    fn quiet_handler_draws_nothing() {
        let handler = CliProgressHandler::new(true);
        replay(&handler, vec![Progress::Message("Iteration 1: rejected".into())]);

        let display = handler.display.lock().unwrap();
        assert!(display.bar.is_hidden());
        assert_eq!(display.last_status.as_deref(), Some("Iteration 1: rejected"));
    }

    #[test]
    fn kappa_scan_fills_a_bar_then_refines() {
        let handler = CliProgressHandler::new(true);
        replay(
            &handler,
            vec![
                Progress::PhaseStart { name: "Kappa Search" },
                Progress::TaskStart { total_steps: 1500 },
                Progress::TaskIncrement,
                Progress::TaskIncrement,
            ],
        );
        {
            let display = handler.display.lock().unwrap();
            assert_eq!(display.bar.prefix(), "Kappa scan");
            assert_eq!(display.bar.length(), Some(1500));
            assert_eq!(display.bar.position(), 2);
        }

        replay(&handler, vec![Progress::TaskFinish]);
        let display = handler.display.lock().unwrap();
        assert_eq!(display.bar.position(), 1500);
        assert_eq!(display.scans, 1);
        assert_eq!(display.bar.message(), "Kappa Search: refining");
        assert!(!display.bar.is_finished());
    }

    #[test]
    fn discard_candidates_are_numbered() {
        let handler = CliProgressHandler::new(true);
        let mut events = vec![Progress::PhaseStart { name: DISCARD_PHASE }];
        for iteration in 1..=2 {
            events.push(Progress::TaskStart { total_steps: 10 });
            events.push(Progress::TaskFinish);
            events.push(Progress::Message(format!("Iteration {iteration}: accepted")));
        }
        events.push(Progress::TaskStart { total_steps: 10 });
        replay(&handler, events);

        let display = handler.display.lock().unwrap();
        assert_eq!(display.bar.prefix(), "Candidate 3");
        assert_eq!(display.scans, 2);
        assert_eq!(display.last_status.as_deref(), Some("Iteration 2: accepted"));
    }

    #[test]
    fn finished_phase_names_itself() {
        let handler = CliProgressHandler::new(true);
        replay(
            &handler,
            vec![Progress::PhaseStart { name: "Charge Calculation" }, Progress::PhaseFinish],
        );

        let display = handler.display.lock().unwrap();
        assert!(display.bar.is_finished());
        assert!(display.bar.message().starts_with("✓ Charge Calculation finished in"));
        assert!(display.phase.is_none());
    }

    #[test]
    fn events_from_worker_threads_reach_the_display() {
        let handler = CliProgressHandler::new(true);
        let callback = handler.get_callback();
        callback(Progress::TaskStart { total_steps: 8 });

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    callback(Progress::TaskIncrement);
                    callback(Progress::TaskIncrement);
                });
            }
        });

        assert_eq!(handler.display.lock().unwrap().bar.position(), 8);
    }
}
