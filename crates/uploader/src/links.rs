//! Links to the uploaded objects in the storage console.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::warn;

use relaydrop_transfer::KeyLayout;

/// Characters `encodeURIComponent` escapes.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Bucket name shipped in sample configs.
const PLACEHOLDER_BUCKET: &str = "your-unique-bucket";

/// Where to look at a finished submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLinks {
    /// Console view of the destination folder.
    pub folder_url: String,
    /// Direct URL of the video object, when a video was uploaded.
    pub object_url: Option<String>,
}

impl ResultLinks {
    /// Builds the links, or `None` when the bucket settings are incomplete.
    pub fn build(
        bucket: &str,
        region: &str,
        layout: &KeyLayout,
        folder: &str,
        object_key: Option<&str>,
    ) -> Option<Self> {
        if bucket.is_empty()
            || folder.is_empty()
            || region.is_empty()
            || bucket.contains(PLACEHOLDER_BUCKET)
        {
            warn!("bucket name or region not configured; skipping result links");
            return None;
        }

        let folder_url = format!(
            "https://s3.console.aws.amazon.com/s3/buckets/{bucket}?region={region}&prefix={}",
            layout.folder_prefix(folder)
        );
        let object_url = object_key.map(|key| {
            let encoded: Vec<String> = key
                .split('/')
                .map(|segment| utf8_percent_encode(segment, URI_COMPONENT).to_string())
                .collect();
            format!("https://{bucket}.s3.{region}.amazonaws.com/{}", encoded.join("/"))
        });

        Some(Self {
            folder_url,
            object_url,
        })
    }
}
