use serde::Serialize;

/// Fallback when the photo's extension says nothing useful.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Fallback for recorded clips and unrecognised audio files.
pub const DEFAULT_AUDIO_MIME: &str = "audio/wav";

pub const DEFAULT_PHOTO_NAME: &str = "throat_scan.jpg";
pub const DEFAULT_AUDIO_NAME: &str = "cough_audio.wav";

/// Which capture slot a media buffer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Audio,
}

impl MediaKind {
    /// Top-level mime type a guess must carry to be trusted.
    fn mime_family(self) -> &'static str {
        match self {
            MediaKind::Photo => "image",
            MediaKind::Audio => "audio",
        }
    }

    fn default_mime(self) -> &'static str {
        match self {
            MediaKind::Photo => DEFAULT_IMAGE_MIME,
            MediaKind::Audio => DEFAULT_AUDIO_MIME,
        }
    }

    fn default_name(self) -> &'static str {
        match self {
            MediaKind::Photo => DEFAULT_PHOTO_NAME,
            MediaKind::Audio => DEFAULT_AUDIO_NAME,
        }
    }
}

/// A single captured or selected media buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    pub kind: MediaKind,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

// Buffers can be megabytes; never dump them into logs.
impl std::fmt::Debug for MediaAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaAttachment")
            .field("kind", &self.kind)
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

impl MediaAttachment {
    /// A throat photo. Mime type is inferred from the extension.
    pub fn photo(file_name: &str, bytes: Vec<u8>) -> Self {
        Self::new(MediaKind::Photo, file_name, bytes)
    }

    /// A cough clip, recorded or selected. Mime type is inferred from the extension.
    pub fn audio(file_name: &str, bytes: Vec<u8>) -> Self {
        Self::new(MediaKind::Audio, file_name, bytes)
    }

    fn new(kind: MediaKind, file_name: &str, bytes: Vec<u8>) -> Self {
        let file_name = sanitize_filename(file_name, kind.default_name());
        let mime_type = infer_mime(kind, &file_name);
        Self {
            kind,
            file_name,
            mime_type,
            bytes,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// Guess a mime type from the file extension, constrained to the slot's family.
pub fn infer_mime(kind: MediaKind, file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .iter()
        .find(|m| m.type_().as_str() == kind.mime_family())
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| kind.default_mime().to_string())
}

/// Sanitize a filename. Removes path components and special characters.
///
/// The backend stages uploads under the given name, so nothing resembling a
/// path may leave the client.
pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");

    let sanitized: String = base
        .chars()
        .filter(|&c| c != '\0')
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let sanitized = sanitized.replace("..", "");
    let sanitized: String = sanitized.chars().take(100).collect();

    if sanitized.trim_matches('.').is_empty() {
        fallback.to_string()
    } else {
        sanitized
    }
}
