//! Property-based tests for the transcript
//!
//! These tests verify the store invariants hold for arbitrary operation
//! sequences:
//! - Entries come back in append order
//! - Clearing is idempotent
//! - Snapshots never change after they are taken
//! - Replies always surface the tone and the rewrite verbatim

use super::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    AppendUser(String),
    AppendAssistant(String),
    SetPending(bool),
    Clear,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => "[a-zA-Z0-9 .!?]{0,40}".prop_map(Op::AppendUser),
        4 => "[a-zA-Z0-9 .!?]{0,40}".prop_map(Op::AppendAssistant),
        2 => any::<bool>().prop_map(Op::SetPending),
        1 => Just(Op::Clear),
    ]
}

fn arb_tone() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("positive".to_string()),
        Just("negative".to_string()),
        Just("neutral".to_string()),
        Just("friendly".to_string()),
        "[a-z]{1,12}",
    ]
}

proptest! {
    #[test]
    fn prop_store_matches_model(ops in proptest::collection::vec(arb_op(), 0..50)) {
        let store = ConversationStore::new();
        let mut model: Vec<(Role, String)> = Vec::new();
        let mut pending = false;

        for op in ops {
            match op {
                Op::AppendUser(body) => {
                    store.append(TranscriptEntry::user(body.clone()));
                    model.push((Role::User, body));
                }
                Op::AppendAssistant(body) => {
                    store.append(TranscriptEntry::assistant(body.clone()));
                    model.push((Role::Assistant, body));
                }
                Op::SetPending(value) => {
                    store.set_pending(value);
                    pending = value;
                }
                Op::Clear => {
                    store.clear();
                    model.clear();
                }
            }
        }

        let actual: Vec<(Role, String)> = store
            .snapshot()
            .iter()
            .map(|e| (e.role(), e.body().to_string()))
            .collect();
        prop_assert_eq!(actual, model);
        prop_assert_eq!(store.is_pending(), pending);
    }

    #[test]
    fn prop_clear_twice_equals_clear_once(ops in proptest::collection::vec(arb_op(), 0..20)) {
        let store = ConversationStore::new();
        for op in ops {
            if let Op::AppendUser(body) | Op::AppendAssistant(body) = op {
                store.append(TranscriptEntry::user(body));
            }
        }
        store.clear();
        let once = store.snapshot();
        store.clear();
        prop_assert_eq!(store.snapshot(), once);
        prop_assert!(store.snapshot().is_empty());
    }

    #[test]
    fn prop_snapshot_is_frozen(
        before in proptest::collection::vec("[a-z]{1,10}", 0..10),
        after in proptest::collection::vec("[a-z]{1,10}", 1..10),
    ) {
        let store = ConversationStore::new();
        for body in &before {
            store.append(TranscriptEntry::user(body.clone()));
        }
        let snapshot = store.snapshot();
        for body in after {
            store.append(TranscriptEntry::assistant(body));
        }
        prop_assert_eq!(snapshot.len(), before.len());
        for (entry, body) in snapshot.iter().zip(&before) {
            prop_assert_eq!(entry.body(), body.as_str());
        }
    }

    #[test]
    fn prop_reply_surfaces_tone_then_rewrite(
        tone in arb_tone(),
        rewrite in "[a-zA-Z0-9 .,!?\n]{0,80}",
    ) {
        let reply = compose_reply(&tone, &rewrite);
        let label = tone_label(&tone).to_string();
        let tone_at = reply.find(&label).expect("tone label missing");
        prop_assert!(reply.ends_with(&rewrite));
        prop_assert!(tone_at < reply.len() - rewrite.len());
        if tone_label(&tone).glyph == "❔" {
            prop_assert!(reply.contains(&tone));
        }
    }
}
