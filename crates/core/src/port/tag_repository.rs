// Tag Repository Port (Interface)

use crate::domain::{NewTag, PageRequest, Tag, TagFilter, TagId};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for Tag persistence
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Find tag by ID
    async fn find_by_id(&self, id: TagId) -> Result<Option<Tag>>;

    /// List tags matching the filter, ordered by id
    async fn list(&self, filter: &TagFilter, page: PageRequest) -> Result<Vec<Tag>>;

    /// Count tags matching the filter (ignores paging)
    async fn count(&self, filter: &TagFilter) -> Result<i64>;

    /// Insert a new tag stamped with `now` (ms), returning the stored row
    ///
    /// # Errors
    /// - AppError::Conflict if the name is already taken
    async fn insert(&self, tag: &NewTag, now: i64) -> Result<Tag>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::Mutex;

    /// In-memory repository for tests
    #[derive(Default)]
    pub struct InMemoryTagRepository {
        tags: Mutex<Vec<Tag>>,
    }

    impl InMemoryTagRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed with ready-made tags (ids are taken as given)
        pub fn with_tags(tags: Vec<Tag>) -> Self {
            Self {
                tags: Mutex::new(tags),
            }
        }

        fn matches(filter: &TagFilter, tag: &Tag) -> bool {
            filter.name.as_ref().map_or(true, |name| &tag.name == name)
                && filter.state.map_or(true, |state| tag.state == state)
        }
    }

    #[async_trait]
    impl TagRepository for InMemoryTagRepository {
        async fn find_by_id(&self, id: TagId) -> Result<Option<Tag>> {
            let tags = self.tags.lock().unwrap();
            Ok(tags.iter().find(|t| t.id == id).cloned())
        }

        async fn list(&self, filter: &TagFilter, page: PageRequest) -> Result<Vec<Tag>> {
            let tags = self.tags.lock().unwrap();
            let mut matching: Vec<Tag> = tags
                .iter()
                .filter(|t| Self::matches(filter, t))
                .cloned()
                .collect();
            matching.sort_by_key(|t| t.id);
            Ok(matching
                .into_iter()
                .skip(page.offset() as usize)
                .take(page.limit() as usize)
                .collect())
        }

        async fn count(&self, filter: &TagFilter) -> Result<i64> {
            let tags = self.tags.lock().unwrap();
            Ok(tags.iter().filter(|t| Self::matches(filter, t)).count() as i64)
        }

        async fn insert(&self, tag: &NewTag, now: i64) -> Result<Tag> {
            let mut tags = self.tags.lock().unwrap();
            if tags.iter().any(|t| t.name == tag.name) {
                return Err(AppError::Conflict(format!(
                    "tag '{}' already exists",
                    tag.name
                )));
            }
            let id = tags.iter().map(|t| t.id).max().unwrap_or(0) + 1;
            let stored = Tag {
                id,
                name: tag.name.clone(),
                state: tag.state,
                created_at: now,
                updated_at: now,
            };
            tags.push(stored.clone());
            Ok(stored)
        }
    }
}
