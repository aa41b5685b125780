//! Submission session: the inputs of one upload form and its submit action.

use chrono::NaiveDate;
use tracing::info;

use relaydrop_transfer::{default_folder_name, sanitize_folder_name, sanitize_game_name};

use crate::coordinator::UploadCoordinator;
use crate::error::UploadError;
use crate::links::ResultLinks;
use crate::types::{BatchRequest, FileKind, UploadFile, UploadReport};

/// Current user inputs for one submission.
///
/// On success the selected files are cleared; on failure everything is kept
/// so the same submission can be retried.
#[derive(Debug, Clone, Default)]
pub struct UploadSession {
    game_name: String,
    folder: Option<String>,
    video: Option<UploadFile>,
    archive: Option<UploadFile>,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_game_name(&mut self, name: impl Into<String>) {
        self.game_name = name.into();
    }

    pub fn game_name(&self) -> &str {
        &self.game_name
    }

    /// Overrides the destination folder. An empty value restores the default.
    pub fn set_folder(&mut self, folder: impl Into<String>) {
        let folder = folder.into();
        self.folder = (!folder.trim().is_empty()).then_some(folder);
    }

    /// Destination folder as entered, or the date-based default.
    pub fn folder(&self, today: NaiveDate) -> String {
        self.folder
            .clone()
            .unwrap_or_else(|| default_folder_name(today, &self.game_name))
    }

    pub fn select_video(&mut self, file: UploadFile) {
        self.video = Some(UploadFile {
            kind: FileKind::Video,
            ..file
        });
    }

    /// Selects the archive, replacing any previous one.
    pub fn select_archive(&mut self, file: UploadFile) {
        self.archive = Some(UploadFile {
            kind: FileKind::Archive,
            ..file
        });
    }

    pub fn video(&self) -> Option<&UploadFile> {
        self.video.as_ref()
    }

    pub fn archive(&self) -> Option<&UploadFile> {
        self.archive.as_ref()
    }

    /// Validates and sanitizes the inputs into a batch request.
    ///
    /// The video, when present, comes first.
    pub fn prepare(&self, today: NaiveDate) -> Result<BatchRequest, UploadError> {
        let trimmed = self.game_name.trim();
        if trimmed.is_empty() {
            return Err(UploadError::Validation("Please enter a game name.".into()));
        }

        let files: Vec<UploadFile> = self
            .video
            .iter()
            .chain(self.archive.iter())
            .cloned()
            .collect();
        if files.is_empty() {
            return Err(UploadError::Validation(
                "Please select at least a video or a zip file to upload.".into(),
            ));
        }

        let game_name = sanitize_game_name(trimmed);
        if game_name.is_empty() {
            return Err(UploadError::Validation(
                "Game name has no usable characters.".into(),
            ));
        }
        let folder = sanitize_folder_name(&self.folder(today));
        if folder.is_empty() {
            return Err(UploadError::Validation(
                "Destination folder has no usable characters.".into(),
            ));
        }

        Ok(BatchRequest {
            game_name,
            folder,
            files,
        })
    }

    /// Uploads the selected files through `coordinator`.
    pub async fn submit(
        &mut self,
        coordinator: &UploadCoordinator,
        today: NaiveDate,
    ) -> Result<UploadReport, UploadError> {
        let request = self.prepare(today)?;
        let game_name = request.game_name.clone();
        let folder = request.folder.clone();

        let files = coordinator.upload(request).await?;

        let config = coordinator.config();
        let video_key = files
            .iter()
            .find(|f| f.kind == FileKind::Video)
            .map(|f| f.key.key.as_str());
        let links = ResultLinks::build(
            &config.bucket,
            &config.region,
            &config.layout,
            &folder,
            video_key,
        );

        self.video = None;
        self.archive = None;
        info!(game = %game_name, folder = %folder, files = files.len(), "submission uploaded");

        Ok(UploadReport {
            game_name,
            folder,
            files,
            links,
        })
    }
}
