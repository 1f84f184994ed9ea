//! Ordered media attachments

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One attached clip or still
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    /// Attachment identifier
    pub id: Uuid,
    /// Caption shown under the attachment
    pub caption: String,
    /// MIME content type
    pub content_type: String,
    /// Size of the stored payload
    pub byte_len: u64,
}

impl MediaAttachment {
    /// Create an attachment with a fresh identifier
    #[must_use]
    pub fn new(caption: impl Into<String>, content_type: impl Into<String>, byte_len: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            caption: caption.into(),
            content_type: content_type.into(),
            byte_len,
        }
    }
}

/// Ordered collection of attachments
///
/// Insertion order is presentation order; removal preserves the order of
/// the remaining attachments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSet(IndexMap<Uuid, MediaAttachment>);

impl MediaSet {
    /// Empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attachments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no attachments are present
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append an attachment, returning its id
    pub fn insert(&mut self, attachment: MediaAttachment) -> Uuid {
        let id = attachment.id;
        self.0.insert(id, attachment);
        id
    }

    /// Remove an attachment; returns it if present
    pub fn remove(&mut self, id: Uuid) -> Option<MediaAttachment> {
        self.0.shift_remove(&id)
    }

    /// Look up an attachment
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&MediaAttachment> {
        self.0.get(&id)
    }

    /// Update a caption; returns false if the attachment is unknown
    pub fn set_caption(&mut self, id: Uuid, caption: impl Into<String>) -> bool {
        match self.0.get_mut(&id) {
            Some(a) => {
                a.caption = caption.into();
                true
            }
            None => false,
        }
    }

    /// Iterate attachments in presentation order
    pub fn iter(&self) -> impl Iterator<Item = &MediaAttachment> {
        self.0.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_preserves_order() {
        let mut set = MediaSet::new();
        let a = set.insert(MediaAttachment::new("gate cam", "image/png", 1024));
        let b = set.insert(MediaAttachment::new("lot overview", "video/mp4", 4096));
        let order: Vec<Uuid> = set.iter().map(|m| m.id).collect();
        assert_eq!(order, vec![a, b]);
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let mut set = MediaSet::new();
        let a = set.insert(MediaAttachment::new("one", "image/png", 1));
        let b = set.insert(MediaAttachment::new("two", "image/png", 2));
        let c = set.insert(MediaAttachment::new("three", "image/png", 3));

        assert!(set.remove(b).is_some());
        let order: Vec<Uuid> = set.iter().map(|m| m.id).collect();
        assert_eq!(order, vec![a, c]);
    }

    #[test]
    fn set_caption_unknown_id_is_false() {
        let mut set = MediaSet::new();
        assert!(!set.set_caption(Uuid::new_v4(), "nope"));
    }
}
