//! Turns upload events into log lines.

use std::collections::HashMap;

use relaydrop_transfer::default_status;
use relaydrop_uploader::UploadEvent;

struct FileLine {
    name: String,
    status: String,
    step: u32,
}

/// Per-file progress display state.
///
/// A progress event produces a line only when the status text changes or
/// the fraction crosses into a new 10% step.
#[derive(Default)]
pub struct ProgressRenderer {
    files: HashMap<String, FileLine>,
}

impl ProgressRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles one event, returning the line to print, if any.
    pub fn handle(&mut self, event: &UploadEvent) -> Option<String> {
        match event {
            UploadEvent::Started {
                file_id,
                name,
                key,
                size,
            } => {
                self.files.insert(
                    file_id.clone(),
                    FileLine {
                        name: name.clone(),
                        status: String::new(),
                        step: 0,
                    },
                );
                Some(format!("{name}: uploading {size} bytes to {key}"))
            }
            UploadEvent::Progress {
                file_id,
                fraction,
                status,
            } => {
                let line = self.files.get_mut(file_id)?;
                let status = status
                    .clone()
                    .unwrap_or_else(|| default_status(*fraction).to_string());
                let step = (fraction * 10.0).floor() as u32;
                if status == line.status && step <= line.step {
                    return None;
                }
                line.status = status;
                line.step = line.step.max(step);
                Some(format!(
                    "{}: {:>3.0}% {}",
                    line.name,
                    fraction * 100.0,
                    line.status
                ))
            }
            UploadEvent::Completed { file_id, key } => {
                let name = self.files.get(file_id).map_or(file_id.as_str(), |l| l.name.as_str());
                Some(format!("{name}: done ({key})"))
            }
            UploadEvent::Failed { file_id, error } => {
                let name = self.files.get(file_id).map_or(file_id.as_str(), |l| l.name.as_str());
                Some(format!("{name}: failed: {error}"))
            }
        }
    }
}
