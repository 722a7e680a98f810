//! Media storage on the local filesystem. Entry images live under a
//! date-partitioned tree, avatars in a flat directory; rows reference
//! files by their path relative to the media root.

use std::path::{Component, Path, PathBuf};

use chrono::NaiveDate;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_env() -> Self {
        let root = std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "./media".to_string());
        Self::new(root)
    }

    /// Relative path for a new entry image: diary_images/YYYY/MM/DD/<uuid>.<ext>
    pub fn entry_image_path(date: NaiveDate, id: Uuid, original_name: &str) -> String {
        format!(
            "diary_images/{}/{}.{}",
            date.format("%Y/%m/%d"),
            id,
            extension_of(original_name)
        )
    }

    /// Relative path for a new avatar: avatars/<uuid>.<ext>
    pub fn avatar_path(id: Uuid, original_name: &str) -> String {
        format!("avatars/{}.{}", id, extension_of(original_name))
    }

    /// Maps a relative path back to a location under the root, refusing
    /// anything that would escape it.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let rel = Path::new(relative);
        let safe = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || relative.is_empty() {
            return None;
        }
        Some(self.root.join(rel))
    }

    pub async fn save(&self, relative: &str, bytes: &[u8]) -> std::io::Result<()> {
        let path = self.resolve(relative).ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path escapes media root")
        })?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await
    }

    pub async fn read(&self, relative: &str) -> std::io::Result<Vec<u8>> {
        let path = self.resolve(relative).ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "path escapes media root")
        })?;
        tokio::fs::read(&path).await
    }

    /// Best-effort removal; a file already gone is not an error worth
    /// failing the request over.
    pub async fn delete(&self, relative: &str) {
        if let Some(path) = self.resolve(relative) {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::warn!("failed to remove media file {relative}: {e}");
            }
        }
    }
}

/// Accept only image uploads; the exact format does not matter.
pub fn is_image(content_type: &str) -> bool {
    content_type
        .parse::<mime::Mime>()
        .map(|m| m.type_() == mime::IMAGE)
        .unwrap_or(false)
}

fn extension_of(name: &str) -> &str {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .unwrap_or("jpg")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn entry_image_path_is_date_partitioned() {
        let id = Uuid::nil();
        let path = MediaStore::entry_image_path(date(2026, 8, 27), id, "photo.PNG");
        assert_eq!(
            path,
            format!("diary_images/2026/08/27/{id}.PNG")
        );
    }

    #[test]
    fn avatar_path_is_flat() {
        let id = Uuid::nil();
        assert_eq!(
            MediaStore::avatar_path(id, "me.jpeg"),
            format!("avatars/{id}.jpeg")
        );
    }

    #[test]
    fn extension_falls_back_to_jpg() {
        let id = Uuid::nil();
        assert_eq!(MediaStore::avatar_path(id, "noext"), format!("avatars/{id}.jpg"));
        assert_eq!(MediaStore::avatar_path(id, ""), format!("avatars/{id}.jpg"));
    }

    #[test]
    fn resolve_rejects_traversal() {
        let store = MediaStore::new("/srv/media");
        assert!(store.resolve("../etc/passwd").is_none());
        assert!(store.resolve("/etc/passwd").is_none());
        assert!(store.resolve("diary_images/../../x").is_none());
        assert!(store.resolve("").is_none());
        assert_eq!(
            store.resolve("avatars/a.jpg"),
            Some(PathBuf::from("/srv/media/avatars/a.jpg"))
        );
    }

    #[test]
    fn image_content_types() {
        assert!(is_image("image/png"));
        assert!(is_image("image/jpeg"));
        assert!(!is_image("video/mp4"));
        assert!(!is_image("not a mime"));
    }
}
