// Tag Service Port - the RPC Service boundary
//
// The transport layer knows only this trait: each method takes a typed request
// and yields exactly one outcome, a value or a Structured Error.

use crate::domain::{NewTag, PageRequest, Status, Tag, TagFilter, TagId, TagPage};
use async_trait::async_trait;

#[async_trait]
pub trait TagService: Send + Sync {
    /// GetTag
    async fn get_tag(&self, id: TagId) -> Result<Tag, Status>;

    /// GetTagList
    async fn list_tags(&self, filter: TagFilter, page: PageRequest) -> Result<TagPage, Status>;

    /// CreateTag
    async fn create_tag(&self, tag: NewTag) -> Result<Tag, Status>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock service behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Return this tag from every method
        Tag(Tag),
        /// Fail every method with this status
        Fail(Status),
        /// Panic with message (for recovery testing)
        Panic(String),
    }

    /// Stub Tag Service that ignores its input and follows a fixed behavior
    pub struct StubTagService {
        behavior: MockBehavior,
        call_count: AtomicUsize,
    }

    impl StubTagService {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn returning(tag: Tag) -> Self {
            Self::new(MockBehavior::Tag(tag))
        }

        pub fn failing(status: Status) -> Self {
            Self::new(MockBehavior::Fail(status))
        }

        pub fn panicking(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Panic(message.into()))
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        fn respond(&self) -> Result<Tag, Status> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                MockBehavior::Tag(tag) => Ok(tag.clone()),
                MockBehavior::Fail(status) => Err(status.clone()),
                MockBehavior::Panic(msg) => panic!("{}", msg),
            }
        }
    }

    #[async_trait]
    impl TagService for StubTagService {
        async fn get_tag(&self, _id: TagId) -> Result<Tag, Status> {
            self.respond()
        }

        async fn list_tags(&self, _filter: TagFilter, page: PageRequest) -> Result<TagPage, Status> {
            let tag = self.respond()?;
            Ok(TagPage {
                tags: vec![tag],
                page,
                total_rows: 1,
            })
        }

        async fn create_tag(&self, _tag: NewTag) -> Result<Tag, Status> {
            self.respond()
        }
    }
}
