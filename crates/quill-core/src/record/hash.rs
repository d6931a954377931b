//! Content-addressed record identifiers.
//!
//! A record's id is the BLAKE3 hash of its signed fields, rendered as
//! `blake3:<lowercase hex>`. The hash input is the JSON serialization of the
//! fixed-order array `[1, author, created_at, kind, tags, content]` — field
//! order is pinned by the array, so the serialization is canonical without a
//! key-sorting pass.
//!
//! Two records with identical signed fields therefore share an id and
//! collapse to one logical fact, no matter how many relays returned a copy;
//! deduplication in [`super::RecordSet`] is structural.

use serde::Serialize;

use super::{RawRecord, RecordId, RecordKind, Timestamp};
use crate::identity::AuthorKey;

/// Version discriminant baked into the hash input, bumped only on
/// incompatible changes to the signed-field layout.
const HASH_LAYOUT_VERSION: u8 = 1;

/// Prefix of every rendered record id.
pub const ID_PREFIX: &str = "blake3:";

#[derive(Serialize)]
struct SignedFields<'a>(
    u8,
    &'a AuthorKey,
    Timestamp,
    &'a str,
    &'a [Vec<String>],
    &'a str,
);

/// Compute the content address of a record's signed fields.
#[must_use]
pub fn compute_record_id(
    author: &AuthorKey,
    created_at: Timestamp,
    kind: &RecordKind,
    tags: &[Vec<String>],
    content: &str,
) -> RecordId {
    let fields = SignedFields(
        HASH_LAYOUT_VERSION,
        author,
        created_at,
        kind.as_str(),
        tags,
        content,
    );
    let hash = blake3::hash(canonical_json(&fields).as_bytes());
    RecordId::new(format!("{ID_PREFIX}{hash}"))
}

fn canonical_json(fields: &SignedFields<'_>) -> String {
    // A tuple of strings, ints, and string arrays cannot fail to serialize.
    serde_json::to_string(fields).expect("record field serialization cannot fail")
}

/// Verify that a record's stored id matches its recomputed content address.
///
/// Returns `true` when the stored id is the hash of the record's signed
/// fields. A `false` result means the record was tampered with (or minted by
/// a client that disagrees on the layout) and should not be trusted as the
/// fact it claims to be.
#[must_use]
pub fn verify_record_id(record: &RawRecord) -> bool {
    let expected = compute_record_id(
        &record.author,
        record.created_at,
        &record.kind,
        &record.tags,
        &record.content,
    );
    record.id == expected
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tag;

    fn stamped_record() -> RawRecord {
        let author = AuthorKey::new_unchecked("f00d");
        let tags = vec![tag("d", "draft-7"), tag("title", "Notes")];
        let id = compute_record_id(
            &author,
            1_720_000_000,
            &RecordKind::Document,
            &tags,
            "body",
        );
        RawRecord {
            id,
            author,
            created_at: 1_720_000_000,
            kind: RecordKind::Document,
            tags,
            content: "body".into(),
            sig: String::new(),
        }
    }

    #[test]
    fn id_has_prefix_and_hex_body() {
        let record = stamped_record();
        let hex = record
            .id
            .as_str()
            .strip_prefix(ID_PREFIX)
            .expect("prefixed");
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn deterministic_for_identical_fields() {
        let a = stamped_record();
        let b = stamped_record();
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn content_changes_the_id() {
        let base = stamped_record();
        let other = compute_record_id(
            &base.author,
            base.created_at,
            &base.kind,
            &base.tags,
            "different body",
        );
        assert_ne!(base.id, other);
    }

    #[test]
    fn timestamp_changes_the_id() {
        let base = stamped_record();
        let other = compute_record_id(
            &base.author,
            base.created_at + 1,
            &base.kind,
            &base.tags,
            &base.content,
        );
        assert_ne!(base.id, other);
    }

    #[test]
    fn tag_order_changes_the_id() {
        let base = stamped_record();
        let mut reordered = base.tags.clone();
        reordered.reverse();
        let other = compute_record_id(
            &base.author,
            base.created_at,
            &base.kind,
            &reordered,
            &base.content,
        );
        assert_ne!(base.id, other, "tag order is part of the signed fields");
    }

    #[test]
    fn verify_accepts_untampered() {
        assert!(verify_record_id(&stamped_record()));
    }

    #[test]
    fn verify_rejects_tampered_content() {
        let mut record = stamped_record();
        record.content.push_str(" (edited)");
        assert!(!verify_record_id(&record));
    }

    #[test]
    fn verify_rejects_tampered_author() {
        let mut record = stamped_record();
        record.author = AuthorKey::new_unchecked("beef");
        assert!(!verify_record_id(&record));
    }

    #[test]
    fn signature_is_not_part_of_the_address() {
        let mut record = stamped_record();
        record.sig = "ff".repeat(32);
        assert!(verify_record_id(&record));
    }
}
