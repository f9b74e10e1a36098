use std::path::Path;

use lofty::picture::PictureType;
use lofty::prelude::*;
use tracing::debug;

use crate::error::{PlayerError, Result};

/// Embedded cover art.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// What a tag read yields. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagInfo {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub picture: Option<Picture>,
}

fn non_empty(s: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Read title, artist and the front cover (or first picture) from `path`.
pub fn read_tags(path: &Path) -> Result<TagInfo> {
    let tagged = lofty::read_from_path(path)
        .map_err(|e| PlayerError::MetadataExtraction(format!("{}: {e}", path.display())))?;

    let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
        debug!(path = %path.display(), "no tags");
        return Ok(TagInfo::default());
    };

    let pictures = tag.pictures();
    let picture = pictures
        .iter()
        .find(|p| matches!(p.pic_type(), PictureType::CoverFront))
        .or_else(|| pictures.first())
        .map(|p| Picture {
            mime: p
                .mime_type()
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "image/jpeg".to_string()),
            bytes: p.data().to_vec(),
        });

    Ok(TagInfo {
        title: non_empty(tag.title()),
        artist: non_empty(tag.artist()),
        picture,
    })
}
