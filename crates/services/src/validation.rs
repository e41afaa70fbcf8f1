//! Pre-store validation rules.
//!
//! Every rule runs before any store call and maps to its own
//! [`ValidationError`] variant, so the API layer can surface the exact
//! violation to the user.

use domains::{NewOgiriEvent, NewThread, ThreadPatch, ValidationError};

/// Maximum length for a thread title in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// Maximum length for thread content in characters.
pub const MAX_CONTENT_CHARS: usize = 10_000;

/// Maximum number of tags on a thread.
pub const MAX_TAGS: usize = 5;

/// Maximum length for a single tag in characters.
pub const MAX_TAG_CHARS: usize = 20;

/// Maximum length for a comment in characters.
pub const MAX_COMMENT_CHARS: usize = 1_000;

/// Answer window bounds, in minutes.
pub const MIN_DURATION_MINUTES: u32 = 1;
pub const MAX_DURATION_MINUTES: u32 = 1_440;

/// Per-user answer cap bounds.
pub const MIN_MAX_RESPONSES: u32 = 1;
pub const MAX_MAX_RESPONSES: u32 = 10;

pub fn validate_new_thread(input: &NewThread) -> Result<(), ValidationError> {
    validate_title(&input.title)?;
    validate_content(&input.content)?;
    validate_tags(&input.tags)
}

pub fn validate_thread_patch(patch: &ThreadPatch) -> Result<(), ValidationError> {
    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    if let Some(content) = &patch.content {
        validate_content(content)?;
    }
    if let Some(tags) = &patch.tags {
        validate_tags(tags)?;
    }
    Ok(())
}

pub fn validate_comment_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyComment);
    }
    if text.chars().count() > MAX_COMMENT_CHARS {
        return Err(ValidationError::CommentTooLong {
            max: MAX_COMMENT_CHARS,
        });
    }
    if contains_url(text) {
        return Err(ValidationError::CommentContainsUrl);
    }
    Ok(())
}

pub fn validate_new_event(input: &NewOgiriEvent) -> Result<(), ValidationError> {
    if input.odai.prompt().trim().is_empty() {
        return Err(ValidationError::EmptyOdai);
    }
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&input.duration_minutes) {
        return Err(ValidationError::InvalidDuration {
            min: MIN_DURATION_MINUTES,
            max: MAX_DURATION_MINUTES,
        });
    }
    if !(MIN_MAX_RESPONSES..=MAX_MAX_RESPONSES).contains(&input.max_responses) {
        return Err(ValidationError::InvalidMaxResponses {
            min: MIN_MAX_RESPONSES,
            max: MAX_MAX_RESPONSES,
        });
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ValidationError::TitleTooLong {
            max: MAX_TITLE_CHARS,
        });
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<(), ValidationError> {
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(ValidationError::ContentTooLong {
            max: MAX_CONTENT_CHARS,
        });
    }
    Ok(())
}

fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAGS {
        return Err(ValidationError::TooManyTags { max: MAX_TAGS });
    }
    for tag in tags {
        if tag.chars().count() > MAX_TAG_CHARS {
            return Err(ValidationError::TagTooLong { max: MAX_TAG_CHARS });
        }
    }
    Ok(())
}

/// Comments may not carry links; a scheme or a bare `www.` both count.
fn contains_url(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("http://") || lower.contains("https://") || lower.contains("www.")
}
