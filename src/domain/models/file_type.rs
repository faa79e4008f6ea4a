use serde::{Deserialize, Serialize};

/// Coarse content classification used by clients to pick a preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileType {
    Folder,
    Image,
    Audio,
    UnknownFile,
}

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "bmp"];
const AUDIO_EXTENSIONS: [&str; 1] = ["mp3"];

impl FileType {
    /// Classify a logical path by its trailing slash and extension
    pub fn detect(path: &str) -> Self {
        if path.is_empty() || path.ends_with('/') {
            return FileType::Folder;
        }

        let name = path.rsplit('/').next().unwrap_or(path);
        let extension = match name.rfind('.') {
            Some(idx) => name[idx + 1..].to_lowercase(),
            None => return FileType::UnknownFile,
        };

        if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            FileType::Image
        } else if AUDIO_EXTENSIONS.contains(&extension.as_str()) {
            FileType::Audio
        } else {
            FileType::UnknownFile
        }
    }
}

/// Media type served for a stored file
pub fn content_type_for(path: &str) -> &'static str {
    match FileType::detect(path) {
        FileType::Audio => "audio/mpeg",
        FileType::Image => match path.rsplit('.').next().map(str::to_lowercase).as_deref() {
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("bmp") => "image/bmp",
            _ => "image/jpeg",
        },
        FileType::Folder | FileType::UnknownFile => "application/octet-stream",
    }
}
