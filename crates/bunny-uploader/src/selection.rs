//! Media selection for an event form.
//!
//! Files are validated when they are added. A rejected file never enters the
//! selection and never disturbs files that were already accepted.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use uuid::Uuid;

use bunny_core::models::{MediaFile, MediaKind, MediaSource};
use bunny_core::validation::{classify, content_type_for_extension, file_extension};
use bunny_core::{validate_media_file, AppError, AppResult, MediaRules};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A file the user picked, not yet validated.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub source: MediaSource,
}

impl CandidateFile {
    pub fn from_bytes(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            size: data.len() as u64,
            content_type: content_type.into(),
            source: MediaSource::Memory(data),
        }
    }

    /// Stat a local file. The content type is derived from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(AppError::InvalidInput(format!(
                "Not a regular file: {}",
                path.display()
            )));
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_string())
            .ok_or_else(|| {
                AppError::InvalidInput(format!("Invalid file name: {}", path.display()))
            })?;

        let content_type = content_type_for_extension(&file_extension(&name))
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();

        Ok(Self {
            name,
            size: metadata.len(),
            content_type,
            source: MediaSource::Path(PathBuf::from(path)),
        })
    }

    /// Kind implied by the MIME type.
    pub fn kind(&self) -> MediaKind {
        classify(&self.content_type)
    }
}

/// Validate a candidate as the given kind and assign it an id.
pub fn accept(rules: &MediaRules, candidate: CandidateFile, kind: MediaKind) -> AppResult<MediaFile> {
    validate_media_file(rules, &candidate.name, candidate.size, kind)?;
    Ok(MediaFile::new(
        candidate.name,
        candidate.size,
        candidate.content_type,
        kind,
        candidate.source,
    ))
}

/// Result of validating a list of candidates.
#[derive(Debug, Default)]
pub struct Partition {
    pub accepted: Vec<MediaFile>,
    pub rejected: Vec<(String, AppError)>,
}

/// Split candidates into accepted and rejected gallery files.
///
/// Deterministic: the same list always yields the same split (ids are fresh each time).
pub fn partition(rules: &MediaRules, candidates: &[CandidateFile]) -> Partition {
    let mut result = Partition::default();
    for candidate in candidates {
        let kind = candidate.kind();
        match accept(rules, candidate.clone(), kind) {
            Ok(file) => result.accepted.push(file),
            Err(err) => result.rejected.push((candidate.name.clone(), err)),
        }
    }
    result
}

/// Gallery entry with its display metadata.
#[derive(Debug, Clone)]
pub struct GalleryItem {
    pub file: MediaFile,
    pub caption: String,
    pub featured: bool,
}

/// Cover image plus gallery media of one event form.
#[derive(Debug, Clone)]
pub struct MediaSelection {
    rules: MediaRules,
    cover: Option<MediaFile>,
    gallery: Vec<GalleryItem>,
}

impl MediaSelection {
    pub fn new(rules: MediaRules) -> Self {
        Self {
            rules,
            cover: None,
            gallery: Vec::new(),
        }
    }

    /// Set or replace the cover image. The cover is always validated as an image.
    pub fn set_cover(&mut self, candidate: CandidateFile) -> AppResult<Uuid> {
        let file = accept(&self.rules, candidate, MediaKind::Image)?;
        let id = file.id;
        self.cover = Some(file);
        Ok(id)
    }

    pub fn clear_cover(&mut self) {
        self.cover = None;
    }

    /// Add a gallery file, typed by its MIME type.
    pub fn add_gallery_item(
        &mut self,
        candidate: CandidateFile,
        caption: impl Into<String>,
        featured: bool,
    ) -> AppResult<Uuid> {
        let kind = candidate.kind();
        let file = accept(&self.rules, candidate, kind)?;
        let id = file.id;
        self.gallery.push(GalleryItem {
            file,
            caption: caption.into(),
            featured,
        });
        Ok(id)
    }

    pub fn remove_gallery_item(&mut self, id: Uuid) -> Option<GalleryItem> {
        let index = self.gallery.iter().position(|item| item.file.id == id)?;
        Some(self.gallery.remove(index))
    }

    /// Update caption and featured flag of a gallery item.
    pub fn update_gallery_item(&mut self, id: Uuid, caption: &str, featured: bool) -> bool {
        match self.gallery.iter_mut().find(|item| item.file.id == id) {
            Some(item) => {
                item.caption = caption.to_string();
                item.featured = featured;
                true
            }
            None => false,
        }
    }

    /// Form reset.
    pub fn clear(&mut self) {
        self.cover = None;
        self.gallery.clear();
    }

    pub fn cover(&self) -> Option<&MediaFile> {
        self.cover.as_ref()
    }

    pub fn gallery(&self) -> &[GalleryItem] {
        &self.gallery
    }

    /// Every file of the batch: cover first, then gallery in insertion order.
    pub fn files(&self) -> Vec<&MediaFile> {
        self.cover
            .iter()
            .chain(self.gallery.iter().map(|item| &item.file))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.gallery.len() + usize::from(self.cover.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: usize = 1024 * 1024;

    fn candidate(name: &str, content_type: &str, size: usize) -> CandidateFile {
        CandidateFile::from_bytes(name, content_type, vec![0u8; size])
    }

    #[test]
    fn rejected_file_leaves_selection_untouched() {
        let mut selection = MediaSelection::new(MediaRules::default());
        let first = selection
            .add_gallery_item(candidate("a.png", "image/png", MB), "A", false)
            .unwrap();

        let err = selection
            .add_gallery_item(candidate("b.png", "image/png", 6 * MB), "B", false)
            .unwrap_err();
        assert!(matches!(err, AppError::FileTooLarge { .. }));

        assert_eq!(selection.gallery().len(), 1);
        assert_eq!(selection.gallery()[0].file.id, first);
    }

    #[test]
    fn gallery_kind_follows_mime_type() {
        let mut selection = MediaSelection::new(MediaRules::default());
        selection
            .add_gallery_item(candidate("race.mp4", "video/mp4", 2 * MB), "", true)
            .unwrap();
        selection
            .add_gallery_item(candidate("team.jpg", "image/jpeg", MB), "", false)
            .unwrap();
        let kinds: Vec<MediaKind> = selection.gallery().iter().map(|i| i.file.kind).collect();
        assert_eq!(kinds, vec![MediaKind::Video, MediaKind::Image]);
    }

    #[test]
    fn cover_must_be_an_image() {
        let mut selection = MediaSelection::new(MediaRules::default());
        let err = selection
            .set_cover(candidate("cover.mp4", "video/mp4", MB))
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::UnsupportedFormat {
                kind: MediaKind::Image,
                ..
            }
        ));
        assert!(selection.cover().is_none());

        selection
            .set_cover(candidate("cover.jpg", "image/jpeg", 2 * MB))
            .unwrap();
        assert_eq!(selection.cover().unwrap().kind, MediaKind::Image);
    }

    #[test]
    fn clear_cover_keeps_gallery() {
        let mut selection = MediaSelection::new(MediaRules::default());
        selection
            .set_cover(candidate("cover.jpg", "image/jpeg", 10))
            .unwrap();
        selection
            .add_gallery_item(candidate("g.png", "image/png", 10), "", false)
            .unwrap();

        selection.clear_cover();
        assert!(selection.cover().is_none());
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.files()[0].name, "g.png");
    }

    #[test]
    fn files_lists_cover_first() {
        let mut selection = MediaSelection::new(MediaRules::default());
        selection
            .add_gallery_item(candidate("g.png", "image/png", 10), "", false)
            .unwrap();
        selection
            .set_cover(candidate("c.jpg", "image/jpeg", 10))
            .unwrap();
        let names: Vec<&str> = selection.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["c.jpg", "g.png"]);
        assert_eq!(selection.len(), 2);

        selection.clear();
        assert!(selection.is_empty());
    }

    #[test]
    fn partition_is_stable_across_runs() {
        let rules = MediaRules::default();
        let candidates = vec![
            candidate("ok.png", "image/png", MB),
            candidate("big.mp4", "video/mp4", 101 * MB),
            candidate("bad.bmp", "image/bmp", 10),
            candidate("ok.mov", "video/quicktime", MB),
        ];

        let names = |p: &Partition| {
            (
                p.accepted.iter().map(|f| f.name.clone()).collect::<Vec<_>>(),
                p.rejected.iter().map(|(n, _)| n.clone()).collect::<Vec<_>>(),
            )
        };

        let first = partition(&rules, &candidates);
        let second = partition(&rules, &candidates);
        assert_eq!(names(&first), names(&second));
        assert_eq!(
            names(&first),
            (
                vec!["ok.png".to_string(), "ok.mov".to_string()],
                vec!["big.mp4".to_string(), "bad.bmp".to_string()]
            )
        );

        let ids: std::collections::HashSet<Uuid> =
            first.accepted.iter().map(|f| f.id).collect();
        assert_eq!(ids.len(), first.accepted.len());
    }

    #[test]
    fn update_and_remove_gallery_items() {
        let mut selection = MediaSelection::new(MediaRules::default());
        let id = selection
            .add_gallery_item(candidate("g.png", "image/png", 10), "old", false)
            .unwrap();
        assert!(selection.update_gallery_item(id, "new", true));
        assert_eq!(selection.gallery()[0].caption, "new");
        assert!(selection.gallery()[0].featured);
        assert!(selection.remove_gallery_item(id).is_some());
        assert!(selection.remove_gallery_item(id).is_none());
    }
}
