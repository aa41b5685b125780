//! Name sanitization and destination key layout.

use chrono::NaiveDate;

use relaydrop_protocol::constants::FALLBACK_CONTENT_TYPE;

/// Default top-level prefix for uploaded objects.
pub const DEFAULT_KEY_PREFIX: &str = "full-game-footage";

/// Default fixed sub-path below the destination folder.
pub const DEFAULT_KEY_SUBPATH: &str = "Game-Video";

/// Layout of destination keys:
/// `<prefix>/<folder>/<subpath>/<name>.<extension>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    pub prefix: String,
    pub subpath: String,
}

impl Default for KeyLayout {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_KEY_PREFIX.into(),
            subpath: DEFAULT_KEY_SUBPATH.into(),
        }
    }
}

impl KeyLayout {
    /// Builds the object key for one file.
    pub fn object_key(&self, folder: &str, name: &str, extension: &str) -> String {
        format!(
            "{}/{folder}/{}/{name}.{extension}",
            self.prefix, self.subpath
        )
    }

    /// Prefix shared by every object uploaded into `folder`.
    pub fn folder_prefix(&self, folder: &str) -> String {
        format!("{}/{folder}/", self.prefix)
    }
}

/// Sanitizes a game name for use as an object name.
///
/// Whitespace runs become `-`, anything outside `[A-Za-z0-9-]` is dropped,
/// repeated hyphens collapse and one leading/trailing hyphen is stripped.
pub fn sanitize_game_name(name: &str) -> String {
    let kept: String = hyphenate_whitespace(name)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    let collapsed = collapse_repeats(&kept, '-');
    strip_once(&collapsed, '-').to_string()
}

/// Sanitizes a destination folder, which may contain `/` separators.
///
/// Whitespace runs become `-`, anything outside `[A-Za-z0-9_/-]` is dropped,
/// repeated slashes collapse and one leading/trailing slash is stripped.
pub fn sanitize_folder_name(folder: &str) -> String {
    let kept: String = hyphenate_whitespace(folder)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/'))
        .collect();
    let collapsed = collapse_repeats(&kept, '/');
    strip_once(&collapsed, '/').to_string()
}

/// Suggested destination folder: `<date>-<game name>`.
pub fn default_folder_name(date: NaiveDate, game_name: &str) -> String {
    let date = date.format("%Y-%m-%d");
    let trimmed = game_name.trim();
    if trimmed.is_empty() {
        return format!("{date}-your-game-name");
    }
    let slug: String = hyphenate_whitespace(trimmed)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    format!("{date}-{slug}")
}

/// Text after the last `.` of a file name, or the whole name without one.
pub fn file_extension(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map_or(file_name, |(_, extension)| extension)
}

/// Content type derived from the extension of an object key.
pub fn content_type_for_key(key: &str) -> &'static str {
    match file_extension(key).to_lowercase().as_str() {
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        _ => FALLBACK_CONTENT_TYPE,
    }
}

fn hyphenate_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_run = false;
    for c in input.chars() {
        if c.is_whitespace() {
            if !in_run {
                out.push('-');
            }
            in_run = true;
        } else {
            in_run = false;
            out.push(c);
        }
    }
    out
}

fn collapse_repeats(input: &str, target: char) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_was_target = false;
    for c in input.chars() {
        if c == target {
            if !prev_was_target {
                out.push(c);
            }
            prev_was_target = true;
        } else {
            prev_was_target = false;
            out.push(c);
        }
    }
    out
}

fn strip_once(input: &str, target: char) -> &str {
    let input = input.strip_prefix(target).unwrap_or(input);
    input.strip_suffix(target).unwrap_or(input)
}
