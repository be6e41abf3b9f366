// Tag Domain Model

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Tag ID (SQLite rowid)
pub type TagId = i64;

pub const MAX_NAME_LEN: usize = 100;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Tag State (wire values: 0 = disabled, 1 = enabled)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagState {
    Disabled,
    Enabled,
}

impl TagState {
    pub fn as_u32(self) -> u32 {
        match self {
            TagState::Disabled => 0,
            TagState::Enabled => 1,
        }
    }

    pub fn from_u32(value: u32) -> Result<Self> {
        match value {
            0 => Ok(TagState::Disabled),
            1 => Ok(TagState::Enabled),
            other => Err(DomainError::InvalidState(other)),
        }
    }
}

impl std::fmt::Display for TagState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagState::Disabled => write!(f, "DISABLED"),
            TagState::Enabled => write!(f, "ENABLED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub state: TagState,
    /// Milliseconds since epoch
    pub created_at: i64,
    pub updated_at: i64,
}

/// Validated input for creating a tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub name: String,
    pub state: TagState,
}

impl NewTag {
    pub fn new(name: impl Into<String>, state: TagState) -> Result<Self> {
        let name = validate_name(name.into())?;
        Ok(Self { name, state })
    }
}

/// List filter; `None` fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    pub name: Option<String>,
    pub state: Option<TagState>,
}

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Normalize raw wire values: zero page/size fall back to defaults, size is capped
    pub fn new(page: u32, page_size: u32) -> Self {
        let page = page.max(1);
        let page_size = match page_size {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        };
        Self { page, page_size }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }

    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// One page of tags plus the unpaged row count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPage {
    pub tags: Vec<Tag>,
    pub page: PageRequest,
    pub total_rows: i64,
}

fn validate_name(name: String) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::ValidationError(
            "tag name cannot be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::ValidationError(format!(
            "tag name too long (max {} chars)",
            MAX_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}
