// Tag Catalog - the Tag Service behind the RPC boundary
//
// Translates repository outcomes into business errors; storage detail stays in
// the logs, never in the client-facing status.

use crate::domain::{errcode, NewTag, PageRequest, Status, Tag, TagFilter, TagId, TagPage};
use crate::error::AppError;
use crate::port::{TagRepository, TagService, TimeProvider};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct TagCatalog {
    repo: Arc<dyn TagRepository>,
    clock: Arc<dyn TimeProvider>,
}

impl TagCatalog {
    pub fn new(repo: Arc<dyn TagRepository>, clock: Arc<dyn TimeProvider>) -> Self {
        Self { repo, clock }
    }
}

#[async_trait]
impl TagService for TagCatalog {
    async fn get_tag(&self, id: TagId) -> Result<Tag, Status> {
        if id <= 0 {
            return Err(errcode::INVALID_PARAMS.with_message(format!("invalid tag id: {}", id)));
        }

        match self.repo.find_by_id(id).await {
            Ok(Some(tag)) => Ok(tag),
            Ok(None) => Err(errcode::TAG_NOT_FOUND.with_message(format!("tag {} not found", id))),
            Err(e) => {
                warn!(tag_id = id, error = %e, "Failed to load tag");
                Err(errcode::GET_TAG_FAIL.to_status())
            }
        }
    }

    async fn list_tags(&self, filter: TagFilter, page: PageRequest) -> Result<TagPage, Status> {
        let total_rows = self.repo.count(&filter).await.map_err(|e| {
            warn!(error = %e, "Failed to count tags");
            errcode::GET_TAG_LIST_FAIL.to_status()
        })?;

        let tags = if total_rows == 0 {
            Vec::new()
        } else {
            self.repo.list(&filter, page).await.map_err(|e| {
                warn!(error = %e, "Failed to list tags");
                errcode::GET_TAG_LIST_FAIL.to_status()
            })?
        };

        debug!(
            total_rows,
            page = page.page,
            page_size = page.page_size,
            returned = tags.len(),
            "Listed tags"
        );
        Ok(TagPage {
            tags,
            page,
            total_rows,
        })
    }

    async fn create_tag(&self, tag: NewTag) -> Result<Tag, Status> {
        let now = self.clock.now_millis();
        match self.repo.insert(&tag, now).await {
            Ok(stored) => {
                debug!(tag_id = stored.id, name = %stored.name, "Created tag");
                Ok(stored)
            }
            Err(AppError::Conflict(msg)) => Err(errcode::TAG_ALREADY_EXISTS.with_message(msg)),
            Err(e) => {
                warn!(name = %tag.name, error = %e, "Failed to create tag");
                Err(errcode::CREATE_TAG_FAIL.to_status())
            }
        }
    }
}
