use crate::entities::files::MediaKind;
use crate::services::file_service::StagedFile;
use serde::{Deserialize, Serialize};

/// Envelope returned by every Bot API method.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Shared shape of document, video, audio, voice and video note payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaObject {
    pub file_id: String,
    pub file_unique_id: String,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub file_unique_id: String,
    pub width: i32,
    pub height: i32,
    pub file_size: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i32,
    pub from: Option<User>,
    pub chat: Option<Chat>,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub document: Option<MediaObject>,
    pub photo: Option<Vec<PhotoSize>>,
    pub video: Option<MediaObject>,
    pub audio: Option<MediaObject>,
    pub voice: Option<MediaObject>,
    pub video_note: Option<MediaObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentMessage {
    pub message_id: i32,
}

fn short_id(file_id: &str) -> &str {
    let end = file_id
        .char_indices()
        .nth(8)
        .map(|(i, _)| i)
        .unwrap_or(file_id.len());
    &file_id[..end]
}

impl Message {
    /// Pulls the uploadable item out of a message, if it carries one.
    /// Photos use the largest size; unnamed media get a generated name.
    pub fn extract_file(&self) -> Option<StagedFile> {
        if let Some(doc) = &self.document {
            return Some(StagedFile {
                kind: MediaKind::Document,
                file_name: doc.file_name.clone().unwrap_or_else(|| "document".to_string()),
                file_size: doc.file_size.unwrap_or(0),
                storage_ref: doc.file_id.clone(),
            });
        }

        if let Some(photo) = self.photo.as_ref().and_then(|sizes| sizes.last()) {
            return Some(StagedFile {
                kind: MediaKind::Photo,
                file_name: format!("photo_{}.jpg", short_id(&photo.file_id)),
                file_size: photo.file_size.unwrap_or(0),
                storage_ref: photo.file_id.clone(),
            });
        }

        let named = |media: &MediaObject, kind: MediaKind, prefix: &str, ext: &str| StagedFile {
            kind,
            file_name: media
                .file_name
                .clone()
                .unwrap_or_else(|| format!("{}_{}.{}", prefix, short_id(&media.file_id), ext)),
            file_size: media.file_size.unwrap_or(0),
            storage_ref: media.file_id.clone(),
        };

        if let Some(video) = &self.video {
            return Some(named(video, MediaKind::Video, "video", "mp4"));
        }
        if let Some(audio) = &self.audio {
            return Some(named(audio, MediaKind::Audio, "audio", "mp3"));
        }
        // Voice notes and round videos never carry a usable name.
        if let Some(voice) = &self.voice {
            let mut staged = named(voice, MediaKind::Voice, "voice", "ogg");
            staged.file_name = format!("voice_{}.ogg", short_id(&voice.file_id));
            return Some(staged);
        }
        if let Some(note) = &self.video_note {
            let mut staged = named(note, MediaKind::VideoNote, "videonote", "mp4");
            staged.file_name = format!("videonote_{}.mp4", short_id(&note.file_id));
            return Some(staged);
        }

        None
    }

    pub fn sender_id(&self) -> Option<i64> {
        self.from.as_ref().map(|u| u.id)
    }

    pub fn chat_id(&self) -> Option<i64> {
        self.chat.as_ref().map(|c| c.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(file_id: &str, name: Option<&str>, size: i64) -> MediaObject {
        MediaObject {
            file_id: file_id.to_string(),
            file_unique_id: format!("u-{}", file_id),
            file_name: name.map(|s| s.to_string()),
            file_size: Some(size),
        }
    }

    #[test]
    fn test_extract_document_keeps_name() {
        let msg = Message {
            message_id: 1,
            document: Some(media("BQACAgIAAxkBAAIB", Some("report.pdf"), 2048)),
            ..Default::default()
        };
        let staged = msg.extract_file().unwrap();
        assert_eq!(staged.kind, MediaKind::Document);
        assert_eq!(staged.file_name, "report.pdf");
        assert_eq!(staged.file_size, 2048);
        assert_eq!(staged.storage_ref, "BQACAgIAAxkBAAIB");
    }

    #[test]
    fn test_extract_photo_uses_largest_size() {
        let msg = Message {
            message_id: 1,
            photo: Some(vec![
                PhotoSize {
                    file_id: "small-photo-id".to_string(),
                    file_unique_id: "s".to_string(),
                    width: 90,
                    height: 90,
                    file_size: Some(100),
                },
                PhotoSize {
                    file_id: "AgACAgIAAxkBAAIC".to_string(),
                    file_unique_id: "l".to_string(),
                    width: 1280,
                    height: 1280,
                    file_size: Some(90_000),
                },
            ]),
            ..Default::default()
        };
        let staged = msg.extract_file().unwrap();
        assert_eq!(staged.kind, MediaKind::Photo);
        assert_eq!(staged.file_name, "photo_AgACAgIA.jpg");
        assert_eq!(staged.file_size, 90_000);
    }

    #[test]
    fn test_extract_unnamed_video_and_voice() {
        let msg = Message {
            message_id: 1,
            video: Some(media("BAACAgIAAxkBAAID", None, 10)),
            ..Default::default()
        };
        assert_eq!(msg.extract_file().unwrap().file_name, "video_BAACAgIA.mp4");

        let msg = Message {
            message_id: 1,
            voice: Some(media("AwACAgIAAxkBAAIE", Some("ignored.ogg"), 10)),
            ..Default::default()
        };
        let staged = msg.extract_file().unwrap();
        assert_eq!(staged.kind, MediaKind::Voice);
        assert_eq!(staged.file_name, "voice_AwACAgIA.ogg");
    }

    #[test]
    fn test_extract_text_message_has_no_file() {
        let msg = Message {
            message_id: 1,
            text: Some("hello".to_string()),
            ..Default::default()
        };
        assert!(msg.extract_file().is_none());
    }
}
