pub mod cli;

use std::path::{Path, PathBuf};

use bunny_core::models::MediaKind;
use bunny_core::{ErrorMetadata, MediaRules};
use bunny_uploader::{partition, CandidateFile, MediaSelection};
use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Separator between a path and its caption in `--media` arguments.
pub const CAPTION_SEPARATOR: &str = "::";

/// Initialize tracing for the CLI. Logs go to stderr so JSON output stays clean.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Split `PATH::caption` into path and caption. Missing caption yields "".
pub fn parse_media_arg(arg: &str) -> (PathBuf, String) {
    match arg.split_once(CAPTION_SEPARATOR) {
        Some((path, caption)) => (PathBuf::from(path), caption.trim().to_string()),
        None => (PathBuf::from(arg), String::new()),
    }
}

/// Build the media selection of an event from command-line paths.
///
/// Stops at the first file that cannot be read or fails validation.
pub async fn build_selection(
    rules: MediaRules,
    cover: Option<&Path>,
    media: &[String],
    featured_media: &[String],
) -> anyhow::Result<MediaSelection> {
    let mut selection = MediaSelection::new(rules);

    if let Some(path) = cover {
        let candidate = CandidateFile::from_path(path).await?;
        selection
            .set_cover(candidate)
            .map_err(|e| anyhow::anyhow!("Cover image rejected: {}", e.client_message()))?;
    }

    let gallery = media
        .iter()
        .map(|arg| (arg, false))
        .chain(featured_media.iter().map(|arg| (arg, true)));
    for (arg, featured) in gallery {
        let (path, caption) = parse_media_arg(arg);
        let candidate = CandidateFile::from_path(&path).await?;
        let name = candidate.name.clone();
        selection
            .add_gallery_item(candidate, caption, featured)
            .map_err(|e| anyhow::anyhow!("{} rejected: {}", name, e.client_message()))?;
    }

    Ok(selection)
}

#[derive(Debug, Serialize)]
pub struct AcceptedFile {
    pub name: String,
    pub kind: MediaKind,
    pub size: u64,
}

#[derive(Debug, Serialize)]
pub struct RejectedFile {
    pub name: String,
    pub error_code: &'static str,
    pub message: String,
}

/// Outcome of checking local files against the upload rules.
#[derive(Debug, Default, Serialize)]
pub struct ValidationReport {
    pub accepted: Vec<AcceptedFile>,
    pub rejected: Vec<RejectedFile>,
}

/// Check gallery candidates without any network access.
pub async fn validate_paths(rules: &MediaRules, paths: &[PathBuf]) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut candidates = Vec::with_capacity(paths.len());

    for path in paths {
        match CandidateFile::from_path(path).await {
            Ok(candidate) => candidates.push(candidate),
            Err(err) => report.rejected.push(RejectedFile {
                name: path.display().to_string(),
                error_code: err.error_code(),
                message: err.to_string(),
            }),
        }
    }

    let result = partition(rules, &candidates);
    report.accepted = result
        .accepted
        .into_iter()
        .map(|file| AcceptedFile {
            name: file.name,
            kind: file.kind,
            size: file.size,
        })
        .collect();
    report
        .rejected
        .extend(result.rejected.into_iter().map(|(name, err)| RejectedFile {
            name,
            error_code: err.error_code(),
            message: err.client_message(),
        }));
    report
}
