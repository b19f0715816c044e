use serde::{Deserialize, Serialize};

/// Progress of one file, as a whole percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadProgress {
    pub file_name: String,
    pub percent: u8,
}

/// Whole percentage of `sent` out of `total`, rounded to nearest.
///
/// An empty file counts as fully sent.
pub fn progress_percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let sent = sent.min(total) as f64;
    (sent / total as f64 * 100.0).round() as u8
}
