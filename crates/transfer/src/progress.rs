use std::sync::{Arc, Mutex};

/// Receives per-file progress updates.
///
/// Implementations only render; they never feed state back into the
/// uploader. Each file id gets its own stream of updates, and the latest
/// update for a file is the one to display.
pub trait ProgressSink: Send + Sync {
    /// `fraction` is in `[0, 1]`. A `None` status means "use the default
    /// label for this fraction" (see [`default_status`]).
    fn on_progress(&self, file_id: &str, fraction: f64, status: Option<&str>);
}

impl<F> ProgressSink for F
where
    F: Fn(&str, f64, Option<&str>) + Send + Sync,
{
    fn on_progress(&self, file_id: &str, fraction: f64, status: Option<&str>) {
        self(file_id, fraction, status)
    }
}

/// Label shown for an update that carries no explicit status.
pub fn default_status(fraction: f64) -> &'static str {
    if fraction < 1.0 {
        "Uploading..."
    } else {
        "Processing..."
    }
}

/// Progress of a single file, owned by the uploader driving it.
///
/// The reported fraction never decreases: a late, smaller update (e.g. from
/// a part that settled out of order) is raised to the current value.
pub struct ProgressState {
    file_id: String,
    sink: Arc<dyn ProgressSink>,
    inner: Mutex<ProgressInner>,
}

struct ProgressInner {
    fraction: f64,
    status: Option<String>,
}

impl ProgressState {
    /// Creates the state and publishes the initial "Starting..." update.
    pub fn new(file_id: impl Into<String>, sink: Arc<dyn ProgressSink>) -> Self {
        let state = Self {
            file_id: file_id.into(),
            sink,
            inner: Mutex::new(ProgressInner {
                fraction: 0.0,
                status: None,
            }),
        };
        state.update(0.0, Some("Starting..."));
        state
    }

    /// Publishes a new fraction and optional status.
    pub fn update(&self, fraction: f64, status: Option<&str>) {
        let mut inner = self.inner.lock().unwrap();
        let fraction = if fraction.is_nan() {
            inner.fraction
        } else {
            fraction.clamp(0.0, 1.0).max(inner.fraction)
        };
        inner.fraction = fraction;
        inner.status = status.map(str::to_string);
        self.sink.on_progress(&self.file_id, fraction, status);
    }

    /// Publishes byte-level progress.
    pub fn update_bytes(&self, loaded: u64, total: u64) {
        if total == 0 {
            return;
        }
        self.update(loaded as f64 / total as f64, None);
    }

    /// Marks the file as finished.
    pub fn complete(&self) {
        self.update(1.0, Some("Complete"));
    }

    /// Marks the file as failed, keeping the fraction reached so far.
    pub fn fail(&self, message: &str) {
        let current = self.fraction();
        self.update(current, Some(&format!("Error: {message}")));
    }

    /// Returns the file id this state reports for.
    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    /// Returns the last published fraction.
    pub fn fraction(&self) -> f64 {
        self.inner.lock().unwrap().fraction
    }

    /// Returns the last published explicit status, if any.
    pub fn status(&self) -> Option<String> {
        self.inner.lock().unwrap().status.clone()
    }
}
