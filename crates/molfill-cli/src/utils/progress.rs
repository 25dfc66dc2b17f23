use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use molfill::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 100;

/// Terminal state for one fill run: the bar plus what the engine has told us so far.
struct FillBar {
    bar: ProgressBar,
    target: Option<usize>,
    placed: usize,
    notices: Vec<String>,
}

impl FillBar {
    fn new(draw_target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(None, draw_target).with_style(spinner_style());
        Self {
            bar,
            target: None,
            placed: 0,
            notices: Vec::new(),
        }
    }

    fn apply(&mut self, event: Progress) {
        match event {
            Progress::PhaseStart { name } => {
                self.bar.reset();
                self.bar.set_style(spinner_style());
                self.bar.set_prefix(name);
                self.bar.set_message("");
                self.bar
                    .enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
            }
            Progress::PhaseFinish => {
                self.bar.disable_steady_tick();
                self.bar.finish_with_message("done");
            }
            Progress::TaskStart {
                total_steps,
                target,
            } => {
                self.target = target;
                self.placed = 0;
                self.bar.disable_steady_tick();
                self.bar.reset();
                self.bar.set_length(total_steps);
                self.bar.set_style(bar_style());
                self.bar.set_message(self.placed_label());
            }
            Progress::TaskIncrement { steps, placed } => {
                self.placed = placed;
                self.bar.inc(steps);
                self.bar.set_message(self.placed_label());
            }
            Progress::TaskFinish => {
                // Early stops leave candidates untried; the bar ends where the filler did.
                self.bar.abandon_with_message(self.placed_label());
            }
            Progress::Message(text) => self.notices.push(text),
        }
    }

    fn placed_label(&self) -> String {
        match self.target {
            Some(target) => format!("placed {}/{}", self.placed, target),
            None => format!("placed {}", self.placed),
        }
    }
}

/// Drives an `indicatif` bar from engine progress events and keeps the notices
/// the engine raises so they can be printed once the bar is gone.
#[derive(Clone)]
pub struct CliProgressHandler {
    state: Arc<Mutex<FillBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    fn with_draw_target(draw_target: ProgressDrawTarget) -> Self {
        Self {
            state: Arc::new(Mutex::new(FillBar::new(draw_target))),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let state = Arc::clone(&self.state);
        Box::new(move |event: Progress| match state.lock() {
            Ok(mut fill_bar) => fill_bar.apply(event),
            Err(_) => warn!("Progress state mutex was poisoned; dropping event."),
        })
    }

    /// Removes the bar from the terminal so the run summary prints on a clean line.
    pub fn clear(&self) {
        match self.state.lock() {
            Ok(fill_bar) => fill_bar.bar.finish_and_clear(),
            Err(_) => warn!("Progress state mutex was poisoned. Cannot clear progress."),
        }
    }

    /// Notices reported during the run, in the order they arrived.
    pub fn notices(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|fill_bar| fill_bar.notices.clone())
            .unwrap_or_default()
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold} {msg}")
        .expect("Failed to create spinner style template")
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{prefix:>10.bold} [{bar:32.green/white}] {pos}/{len} tried, {msg} ({elapsed})",
    )
    .expect("Failed to create bar style template")
    .progress_chars("=> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use molfill::engine::progress::PROGRESS_STRIDE;
    use std::thread;

    fn hidden() -> CliProgressHandler {
        CliProgressHandler::with_draw_target(ProgressDrawTarget::hidden())
    }

    fn with_bar<T>(handler: &CliProgressHandler, read: impl FnOnce(&FillBar) -> T) -> T {
        read(&handler.state.lock().unwrap())
    }

    #[test]
    fn bounded_task_shows_placed_against_target() {
        let handler = hidden();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart { name: "Placement" });
        assert_eq!(with_bar(&handler, |s| s.bar.prefix()), "Placement");

        callback(Progress::TaskStart {
            total_steps: 1000,
            target: Some(40),
        });
        assert_eq!(with_bar(&handler, |s| s.bar.message()), "placed 0/40");

        callback(Progress::TaskIncrement {
            steps: PROGRESS_STRIDE,
            placed: 12,
        });
        callback(Progress::TaskIncrement {
            steps: 3,
            placed: 13,
        });
        with_bar(&handler, |s| {
            assert_eq!(s.bar.position(), PROGRESS_STRIDE + 3);
            assert_eq!(s.bar.message(), "placed 13/40");
        });

        callback(Progress::TaskFinish);
        with_bar(&handler, |s| {
            assert!(s.bar.is_finished());
            assert_eq!(s.bar.position(), PROGRESS_STRIDE + 3);
            assert_eq!(s.bar.message(), "placed 13/40");
        });

        callback(Progress::PhaseFinish);
        assert_eq!(with_bar(&handler, |s| s.bar.message()), "done");
    }

    #[test]
    fn unbounded_task_shows_running_count() {
        let handler = hidden();
        let callback = handler.get_callback();

        callback(Progress::TaskStart {
            total_steps: 8,
            target: None,
        });
        callback(Progress::TaskIncrement {
            steps: 8,
            placed: 5,
        });

        assert_eq!(with_bar(&handler, |s| s.bar.message()), "placed 5");
    }

    #[test]
    fn messages_are_kept_as_notices_in_order() {
        let handler = hidden();
        let callback = handler.get_callback();

        callback(Progress::Message("first".to_string()));
        callback(Progress::PhaseStart { name: "Placement" });
        callback(Progress::Message("second".to_string()));

        assert_eq!(handler.notices(), vec!["first", "second"]);
    }

    #[test]
    fn clear_finishes_the_bar() {
        let handler = hidden();
        let callback = handler.get_callback();
        callback(Progress::TaskStart {
            total_steps: 10,
            target: Some(1),
        });

        handler.clear();
        assert!(with_bar(&handler, |s| s.bar.is_finished()));
    }

    #[test]
    fn callback_is_usable_from_another_thread() {
        let handler = hidden();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart {
                name: "Preparation",
            });
            callback(Progress::Message("Density 1 g/mL sized the run to 7 copies.".into()));
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        assert!(with_bar(&handler, |s| s.bar.is_finished()));
        assert_eq!(handler.notices().len(), 1);
    }
}
