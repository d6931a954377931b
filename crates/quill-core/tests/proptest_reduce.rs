//! Property tests for the reducers and the diff engine.

use proptest::prelude::*;

use quill_core::record::{RecordId, RecordSet};
use quill_core::reduce::{
    DerivedStatus, derived_status, history, pending_counts, suggestions_for,
};
use quill_core::{DiffOp, diff};

// Since generators.rs is a sibling file in tests/, we use #[path] to include it as a module.
#[path = "generators.rs"]
mod generators;
use generators::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(1000))]

    // === History reducer ===

    #[test]
    fn history_is_ingestion_order_independent(batch in arb_snapshot_batch()) {
        let forward = snapshot_set(&batch);
        let reversed: RecordSet = {
            let mut records = forward.clone().into_vec();
            records.reverse();
            records.into_iter().collect()
        };
        prop_assert_eq!(
            history(&forward, &doc_identity()),
            history(&reversed, &doc_identity())
        );
    }

    #[test]
    fn history_is_strictly_descending(batch in arb_snapshot_batch()) {
        let set = snapshot_set(&batch);
        let hist = history(&set, &doc_identity());
        for pair in hist.revisions().windows(2) {
            let newer = (pair[0].created_at, &pair[0].record_id);
            let older = (pair[1].created_at, &pair[1].record_id);
            prop_assert!(newer > older, "history must be strictly descending");
        }
    }

    #[test]
    fn history_monotonic_extension(batch in arb_snapshot_batch(), split in 0_usize..20) {
        // R is a prefix subset of R'; the relative order of record ids
        // present in both histories must be identical.
        let split = split.min(batch.len());
        let small = snapshot_set(&batch[..split]);
        let full = snapshot_set(&batch);

        let before = history(&small, &doc_identity());
        let after = history(&full, &doc_identity());

        let ids_before: Vec<&RecordId> =
            before.revisions().iter().map(|r| &r.record_id).collect();
        let ids_after_restricted: Vec<&RecordId> = after
            .revisions()
            .iter()
            .map(|r| &r.record_id)
            .filter(|id| ids_before.contains(id))
            .collect();
        prop_assert_eq!(ids_before, ids_after_restricted);
    }

    #[test]
    fn history_idempotent_under_duplication(batch in arb_snapshot_batch()) {
        let once = snapshot_set(&batch);
        let mut twice = once.clone();
        twice.extend(once.clone().into_vec());
        prop_assert_eq!(
            history(&once, &doc_identity()),
            history(&twice, &doc_identity())
        );
    }

    // === Status reducer ===

    #[test]
    fn status_ignores_every_untrusted_signal(signals in arb_signal_batch()) {
        let target = doc_identity();
        let proposal = proposal_record(&visitor(), &target, 1, "B");
        let mut set = RecordSet::new();
        set.insert(proposal.clone());

        let mut owner_signals = Vec::new();
        for (is_owner, ts, approves) in &signals {
            let issuer = if *is_owner { owner() } else { visitor() };
            let body = if *approves { "approved" } else { "rejected" };
            let record = signal_record(&issuer, &proposal, *ts, body);
            if *is_owner {
                owner_signals.push(record.clone());
            }
            set.insert(record);
        }

        let derived = derived_status(&set, &proposal.id, &target.owner);

        // The winner among owner signals alone decides; none means pending.
        owner_signals.sort_by(|a, b| {
            (a.created_at, &a.id).cmp(&(b.created_at, &b.id))
        });
        let expected = owner_signals.last().map_or(DerivedStatus::Pending, |w| {
            if w.content == "approved" {
                DerivedStatus::Approved
            } else {
                DerivedStatus::Rejected
            }
        });
        prop_assert_eq!(derived, expected);
    }

    // === Aggregator cross-consistency ===

    #[test]
    fn counts_equal_suggestion_lengths(
        proposal_count in 0_usize..8,
        decided_mask in any::<u8>(),
        spoof_mask in any::<u8>(),
    ) {
        let target = doc_identity();
        let mut set = RecordSet::new();
        set.insert(snapshot_record(&owner(), "draft-7", 1, "body"));

        for i in 0..proposal_count {
            let ts = 10 + i64::try_from(i).expect("small");
            let proposal = proposal_record(&visitor(), &target, ts, "B");
            if decided_mask & (1_u8 << i) != 0 {
                set.insert(signal_record(&owner(), &proposal, ts + 1, "rejected"));
            }
            if spoof_mask & (1_u8 << i) != 0 {
                // Untrusted signal; must not settle anything.
                set.insert(signal_record(&visitor(), &proposal, ts + 2, "approved"));
            }
            set.insert(proposal);
        }

        let identities = vec![target.clone()];
        let counts = pending_counts(&set, &identities);
        prop_assert_eq!(counts[&target], suggestions_for(&set, &target).len());
    }

    // === Diff engine ===

    #[test]
    fn diff_reassembles_both_sides(old in ".{0,40}", new in ".{0,40}") {
        let d = diff(&old, &new);
        prop_assert_eq!(d.old_text(), old);
        prop_assert_eq!(d.new_text(), new);
    }

    #[test]
    fn diff_of_identical_is_one_equal_span(text in ".{0,40}") {
        let d = diff(&text, &text);
        prop_assert_eq!(d.spans().len(), 1);
        prop_assert_eq!(d.spans()[0].op, DiffOp::Equal);
        prop_assert!(d.is_identity());
    }

    #[test]
    fn diff_spans_are_coalesced(old in "[ab]{0,16}", new in "[ab]{0,16}") {
        let d = diff(&old, &new);
        for pair in d.spans().windows(2) {
            prop_assert_ne!(pair[0].op, pair[1].op);
        }
    }

    #[test]
    fn diff_is_deterministic(old in ".{0,24}", new in ".{0,24}") {
        prop_assert_eq!(diff(&old, &new), diff(&old, &new));
    }
}
