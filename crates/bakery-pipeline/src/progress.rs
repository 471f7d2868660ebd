//! Step-counted progress reporting.

/// Receiver of progress updates, e.g. a progress bar.
pub trait ProgressSink {
    /// Called once before the first step with the expected number of steps.
    fn begin(&mut self, total: usize);
    /// Called after every step; `fraction` is in `[0, 1]`.
    fn update(&mut self, title: &str, detail: &str, fraction: f32);
    /// Called once when the bake is over, successful or not.
    fn finish(&mut self);
}

/// Forwards progress to the `log` facade.
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn begin(&mut self, total: usize) {
        log::info!("Baking in {total} steps");
    }

    fn update(&mut self, title: &str, detail: &str, fraction: f32) {
        log::debug!("[{:>3.0}%] {title}: {detail}", fraction * 100.0);
    }

    fn finish(&mut self) {
        log::info!("Bake finished");
    }
}

/// Discards progress.
#[derive(Debug, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn begin(&mut self, _total: usize) {}
    fn update(&mut self, _title: &str, _detail: &str, _fraction: f32) {}
    fn finish(&mut self) {}
}

/// Step counter in front of a [`ProgressSink`].
///
/// The count never passes the total, so a low estimate saturates at 100%.
pub struct Progress<'a> {
    sink: &'a mut dyn ProgressSink,
    title: String,
    done: usize,
    total: usize,
    finished: bool,
}

impl<'a> Progress<'a> {
    pub fn new(sink: &'a mut dyn ProgressSink) -> Self {
        Self {
            sink,
            title: String::new(),
            done: 0,
            total: 0,
            finished: false,
        }
    }

    /// Announces the expected number of steps.
    pub fn start(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
        self.sink.begin(total);
    }

    /// Replaces the expected total once a better estimate is known.
    pub fn retotal(&mut self, total: usize) {
        self.total = total;
        self.done = self.done.min(total);
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Counts one step and reports it with `detail`.
    pub fn step(&mut self, detail: impl AsRef<str>) {
        if self.done < self.total {
            self.done += 1;
        }
        let fraction = if self.total == 0 {
            1.0
        } else {
            self.done as f32 / self.total as f32
        };
        self.sink.update(&self.title, detail.as_ref(), fraction);
    }

    pub fn done(&self) -> usize {
        self.done
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Tells the sink the bake is over. Later calls do nothing.
    pub fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            self.sink.finish();
        }
    }
}
