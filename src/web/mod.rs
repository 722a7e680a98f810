pub mod admin;
pub mod auth;
pub mod entries;
pub mod images;
pub mod media;
pub mod middleware;
pub mod pages;
pub mod profile;

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::Multipart;
use serde_json::{json, Value};

use crate::entities::diary_entry::{self, Mood};
use crate::error::AppError;
use crate::storage;

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Splits a multipart submission into text fields and the image files
/// under `file_field`. Non-image uploads are rejected outright; empty
/// file inputs (submitted but unfilled) are skipped.
pub async fn read_multipart_form(
    mut multipart: Multipart,
    file_field: &str,
) -> Result<(HashMap<String, String>, Vec<UploadedImage>), AppError> {
    let mut fields = HashMap::new();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Upload(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == file_field {
            let file_name = field.file_name().unwrap_or("").to_string();
            let content_type = field.content_type().unwrap_or("").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Upload(e.to_string()))?;
            if data.is_empty() {
                continue;
            }
            if data.len() > MAX_UPLOAD_BYTES {
                return Err(AppError::Upload("File too large".to_string()));
            }
            if !storage::is_image(&content_type) {
                return Err(AppError::Upload("Only image uploads are accepted".to_string()));
            }
            files.push(UploadedImage {
                file_name,
                bytes: data,
            });
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::Upload(e.to_string()))?;
            fields.insert(name, text);
        }
    }

    Ok((fields, files))
}

/// Mood dropdown options for the entry form.
pub fn mood_options(selected: Option<Mood>) -> Value {
    Value::Array(
        Mood::ALL
            .iter()
            .map(|m| {
                json!({
                    "value": m.as_str(),
                    "label": m.label(),
                    "selected": selected == Some(*m),
                })
            })
            .collect(),
    )
}

/// Template-facing view of an entry.
pub fn entry_context(entry: &diary_entry::Model) -> Value {
    json!({
        "id": entry.id,
        "title": entry.title,
        "content": entry.content,
        "mood": entry.mood.map(|m| m.as_str()),
        "mood_label": entry.mood.map(|m| m.label()),
        "tags": entry.tags,
        "tags_list": entry.tags_list(),
        "is_favorite": entry.is_favorite,
        "created_at": entry.created_at.format("%Y-%m-%d %H:%M").to_string(),
        "updated_at": entry.updated_at.format("%Y-%m-%d %H:%M").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn mood_options_mark_the_selection() {
        let options = mood_options(Some(Mood::Calm));
        let list = options.as_array().unwrap();
        assert_eq!(list.len(), 8);
        let selected: Vec<_> = list
            .iter()
            .filter(|o| o["selected"] == true)
            .collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0]["value"], "calm");
    }

    #[test]
    fn entry_context_exposes_mood_label_and_tags() {
        let entry = diary_entry::Model {
            id: 1,
            user_id: 1,
            title: "A day".to_string(),
            content: "text".to_string(),
            mood: Some(Mood::Happy),
            tags: "work,win".to_string(),
            is_favorite: true,
            created_at: NaiveDateTime::parse_from_str("2026-08-27 08:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            updated_at: NaiveDateTime::parse_from_str("2026-08-27 08:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
        };
        let ctx = entry_context(&entry);
        assert_eq!(ctx["mood"], "happy");
        assert_eq!(ctx["mood_label"], "😊 Happy");
        assert_eq!(ctx["tags_list"][1], "win");
        assert_eq!(ctx["created_at"], "2026-08-27 08:00");
    }
}
