/// Candidates evaluated between two `TaskIncrement` events.
pub const PROGRESS_STRIDE: u64 = 256;

#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    /// `target` is the copy count the task aims for, `None` when it fills to capacity.
    TaskStart { total_steps: u64, target: Option<usize> },
    /// `placed` is the running number of accepted copies.
    TaskIncrement { steps: u64, placed: usize },
    TaskFinish,

    /// A notice worth showing the user, such as a shortfall against the target.
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

/// Batches per-candidate ticks into `TaskIncrement` events of at most
/// [`PROGRESS_STRIDE`] steps.
pub(crate) struct StrideCounter<'r, 'a> {
    reporter: &'r ProgressReporter<'a>,
    pending: u64,
    placed: usize,
}

impl<'r, 'a> StrideCounter<'r, 'a> {
    pub(crate) fn new(reporter: &'r ProgressReporter<'a>) -> Self {
        Self {
            reporter,
            pending: 0,
            placed: 0,
        }
    }

    /// Counts one evaluated candidate; `placed` is the accepted count after it.
    #[inline]
    pub(crate) fn tick(&mut self, placed: usize) {
        self.pending += 1;
        self.placed = placed;
        if self.pending == PROGRESS_STRIDE {
            self.flush();
        }
    }

    pub(crate) fn flush(&mut self) {
        if self.pending > 0 {
            self.reporter.report(Progress::TaskIncrement {
                steps: self.pending,
                placed: self.placed,
            });
            self.pending = 0;
        }
    }
}

impl Drop for StrideCounter<'_, '_> {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reporter_without_callback_is_silent() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::Message("ignored".to_string()));
    }

    #[test]
    fn stride_counter_batches_and_flushes_remainder() {
        let steps = Mutex::new(Vec::new());
        {
            let reporter = ProgressReporter::with_callback(Box::new(|event| {
                if let Progress::TaskIncrement { steps: n, placed } = event {
                    steps.lock().unwrap().push((n, placed));
                }
            }));
            let mut counter = StrideCounter::new(&reporter);
            for candidate in 0..(PROGRESS_STRIDE * 2 + 5) {
                counter.tick((candidate / 2) as usize);
            }
        }
        let stride = PROGRESS_STRIDE as usize;
        assert_eq!(
            steps.into_inner().unwrap(),
            vec![
                (PROGRESS_STRIDE, (stride - 1) / 2),
                (PROGRESS_STRIDE, (2 * stride - 1) / 2),
                (5, (2 * stride + 4) / 2),
            ]
        );
    }
}
