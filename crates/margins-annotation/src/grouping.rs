//! Partitioning of a flat comment list into markers.

use std::collections::BTreeMap;

use margins_entity::Comment;

use super::marker::{AnchorKey, Marker};

/// Partitions comments into markers keyed by their anchored offset pair.
///
/// Comments without a text anchor are excluded — they belong to the
/// general discussion list, which is a separate concern. The returned
/// map's iteration order (start, then end) is the marker placement order.
///
/// Linear in comment count apart from the per-marker sort; per-document
/// volumes are tens to low hundreds, so the wholesale rebuild is cheaper
/// than correct incremental patching.
pub fn group_by_anchor(comments: &[Comment]) -> BTreeMap<AnchorKey, Marker> {
    let mut markers: BTreeMap<AnchorKey, Marker> = BTreeMap::new();

    for comment in comments {
        let Some(anchor) = &comment.anchor else {
            continue;
        };
        let key = AnchorKey::from(anchor);

        markers
            .entry(key)
            .or_insert_with(|| Marker {
                key,
                anchor: anchor.clone(),
                comments: Vec::new(),
            })
            .comments
            .push(comment.clone());
    }

    for marker in markers.values_mut() {
        // Creation order with id as tiebreak: grouping must be a pure
        // function of the comment set, independent of input order.
        marker
            .comments
            .sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        if let Some(first) = marker.comments.first() {
            if let Some(anchor) = &first.anchor {
                marker.anchor = anchor.clone();
            }
        }
    }

    markers
}
