/*!
 * Process Table Tests
 * Properties of the (id, context) keyed table and its concurrency
 */

use kubed_sh::process::{DProc, DProcKind, DProcTable, Interpreter, Source};
use kubed_sh::DprocError;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;

fn arb_source() -> impl Strategy<Value = Source> {
    prop_oneof![
        "[a-z]{1,8}".prop_map(Source::binary),
        ("[a-z]{1,8}", prop::sample::select(Interpreter::ALL.to_vec()))
            .prop_map(|(name, interp)| Source::script(interp, format!("{}.src", name))),
    ]
}

fn arb_dproc() -> impl Strategy<Value = DProc> {
    (
        "[a-z][a-z0-9-]{0,8}",
        prop::sample::select(vec!["ctxA", "ctxB", "ctxC"]),
        prop::sample::select(vec![DProcKind::LongRunning, DProcKind::Ephemeral]),
        arb_source(),
    )
        .prop_map(|(id, context, kind, source)| DProc::new(id, kind, context, source))
}

fn table_of(entries: &[DProc]) -> DProcTable {
    let dpt = DProcTable::new();
    for dproc in entries {
        dpt.add(dproc.clone());
    }
    dpt
}

proptest! {
    #[test]
    fn prop_remove_absent_is_noop(entries in prop::collection::vec(arb_dproc(), 0..20), absent in arb_dproc()) {
        let dpt = table_of(&entries);
        prop_assume!(!dpt.contains(&absent.id, &absent.context));

        let before = dpt.dump("");
        prop_assert!(!dpt.remove(&absent));
        prop_assert_eq!(dpt.dump(""), before);
    }

    #[test]
    fn prop_upsert_overwrites(first in arb_dproc(), source in arb_source()) {
        let dpt = DProcTable::new();
        let second = DProc::new(first.id.clone(), DProcKind::LongRunning, first.context.clone(), source);

        dpt.add(first.clone());
        dpt.add(second.clone());

        prop_assert_eq!(dpt.len(), 1);
        prop_assert_eq!(dpt.get(&first.id, &first.context).unwrap(), second);
    }

    #[test]
    fn prop_lookup_after_add(entries in prop::collection::vec(arb_dproc(), 0..20), dproc in arb_dproc()) {
        let dpt = table_of(&entries);
        dpt.add(dproc.clone());
        prop_assert_eq!(dpt.get(&dproc.id, &dproc.context).unwrap(), dproc);
    }

    #[test]
    fn prop_dump_is_sorted_and_scoped(entries in prop::collection::vec(arb_dproc(), 0..30)) {
        let dpt = table_of(&entries);

        let all = dpt.dump("");
        prop_assert_eq!(all.len(), dpt.len());
        prop_assert!(all.windows(2).all(|w| (&w[0].id, &w[0].context) <= (&w[1].id, &w[1].context)));

        let mut contexts: Vec<&str> = all.iter().map(|d| d.context.as_str()).collect();
        contexts.sort();
        contexts.dedup();
        let mut expected: Vec<&str> = entries.iter().map(|d| d.context.as_str()).collect();
        expected.sort();
        expected.dedup();
        prop_assert_eq!(contexts, expected);

        for ctx in ["ctxA", "ctxB", "ctxC"] {
            let scoped = dpt.dump(ctx);
            prop_assert!(scoped.iter().all(|d| d.context == ctx));
            prop_assert!(scoped.windows(2).all(|w| w[0].id < w[1].id));
        }
    }
}

#[test]
fn test_get_missing_is_not_found() {
    let dpt = DProcTable::new();
    assert_eq!(
        dpt.get("web", "ctxA").unwrap_err(),
        DprocError::not_found("web", "ctxA")
    );
}

#[test]
fn test_dump_all_shows_every_context() {
    let dpt = DProcTable::new();
    dpt.add(DProc::new("web", DProcKind::LongRunning, "ctxB", Source::binary("web")));
    dpt.add(DProc::new("api", DProcKind::LongRunning, "ctxA", Source::binary("api")));
    dpt.add(DProc::new("web", DProcKind::LongRunning, "ctxA", Source::binary("web")));

    let ids: Vec<(String, String)> = dpt
        .dump("")
        .into_iter()
        .map(|d| (d.id, d.context))
        .collect();
    assert_eq!(
        ids,
        vec![
            ("api".to_string(), "ctxA".to_string()),
            ("web".to_string(), "ctxA".to_string()),
            ("web".to_string(), "ctxB".to_string()),
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_mutation_keeps_table_consistent() {
    let dpt = Arc::new(DProcTable::new());
    let mut handles = vec![];

    for worker in 0..16 {
        let dpt = Arc::clone(&dpt);
        handles.push(tokio::spawn(async move {
            for i in 0..200 {
                let dproc = DProc::new(
                    format!("p{}", i % 50),
                    DProcKind::LongRunning,
                    format!("ctx{}", worker % 4),
                    Source::binary(format!("p{}", i)),
                );
                dpt.add(dproc.clone());
                let _ = dpt.dump("");
                if i % 3 == 0 {
                    dpt.remove(&dproc);
                }
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    // 50 ids in each of 4 contexts at most, and every key unique
    let all = dpt.dump("");
    assert!(all.len() <= 200);
    let mut keys: Vec<_> = all.iter().map(|d| d.key()).collect();
    keys.dedup();
    assert_eq!(keys.len(), all.len());
}
