//! Avatar storage on the local filesystem.

use std::path::PathBuf;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Decoded payloads above this are rejected.
pub const MAX_AVATAR_BYTES: usize = 2 * 1024 * 1024;

const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "webp"];

#[derive(Debug, Error)]
pub enum AvatarError {
    #[error("invalid base64 payload")]
    Decode(#[from] base64::DecodeError),
    #[error("avatar exceeds {MAX_AVATAR_BYTES} bytes")]
    TooLarge,
    #[error("unsupported content type: {0}")]
    UnsupportedType(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct AvatarStore {
    dir: PathBuf,
}

impl AvatarStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Decode and persist an avatar, replacing any previous one for the
    /// user. Returns the stored file name for `users.avatar_path`.
    pub async fn save(
        &self,
        user_id: Uuid,
        base64_data: &str,
        content_type: &str,
    ) -> Result<String, AvatarError> {
        let ext = extension_for(content_type)
            .ok_or_else(|| AvatarError::UnsupportedType(content_type.to_string()))?;

        let bytes = BASE64.decode(base64_data.trim())?;
        if bytes.len() > MAX_AVATAR_BYTES {
            return Err(AvatarError::TooLarge);
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        // Drop stale files with a different extension first.
        for old_ext in ALLOWED_EXTENSIONS.iter().filter(|&&e| e != ext) {
            let stale = self.dir.join(format!("{user_id}.{old_ext}"));
            let _ = tokio::fs::remove_file(stale).await;
        }

        let file_name = format!("{user_id}.{ext}");
        tokio::fs::write(self.dir.join(&file_name), &bytes).await?;

        info!(%user_id, file_name, size = bytes.len(), "avatar stored");
        Ok(file_name)
    }
}

/// Map an image content type onto a whitelisted file extension.
fn extension_for(content_type: &str) -> Option<&'static str> {
    let extensions = mime_guess::get_mime_extensions_str(content_type)?;
    ALLOWED_EXTENSIONS
        .iter()
        .find(|&&allowed| extensions.contains(&allowed))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_image_types_map_to_extensions() {
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("image/webp"), Some("webp"));
        assert_eq!(extension_for("image/gif"), None);
        assert_eq!(extension_for("application/pdf"), None);
    }

    #[tokio::test]
    async fn save_writes_and_replaces() {
        let tmp = tempfile::tempdir().unwrap();
        let store = AvatarStore::new(tmp.path());
        let user_id = Uuid::new_v4();
        let payload = BASE64.encode(b"not really a png");

        let name = store.save(user_id, &payload, "image/png").await.unwrap();
        assert_eq!(name, format!("{user_id}.png"));
        assert!(tmp.path().join(&name).exists());

        // Re-upload as jpeg replaces the png.
        let name = store.save(user_id, &payload, "image/jpeg").await.unwrap();
        assert_eq!(name, format!("{user_id}.jpg"));
        assert!(!tmp.path().join(format!("{user_id}.png")).exists());
    }

    #[tokio::test]
    async fn oversized_payload_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = AvatarStore::new(tmp.path());
        let payload = BASE64.encode(vec![0u8; MAX_AVATAR_BYTES + 1]);

        let err = store
            .save(Uuid::new_v4(), &payload, "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, AvatarError::TooLarge));
    }
}
