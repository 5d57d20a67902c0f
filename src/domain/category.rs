use serde::{Deserialize, Serialize};

use crate::domain::types::{CategoryId, PostId, TagId};

/// Join row linking one post to one tag.
///
/// At most one row exists per `(post_id, tag_id)` pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub post_id: PostId,
    pub tag_id: TagId,
}
