/*!
 * Reconciler Integration Tests
 * Table build and eviction against an in-memory cluster
 */

use crate::fake_cluster::FakeCluster;
use kubed_sh::process::{DProcTable, Interpreter, Reconciler, Source};
use kubed_sh::{DprocError, Gateway, SupervisedTask};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn seeded_cluster() -> Arc<FakeCluster> {
    let cluster = Arc::new(FakeCluster::new("ctxA", &["ctxA", "ctxB"]));
    cluster.seed_workload("ctxA", "web", Some("script:python:web.py"));
    cluster.seed_workload("ctxB", "api", None);
    cluster.seed_workload("ctxB", "legacy", Some("script:legacy.rb"));
    cluster
}

fn built_table(cluster: &Arc<FakeCluster>) -> Arc<DProcTable> {
    let dpt = Arc::new(DProcTable::new());
    assert_eq!(dpt.build(cluster.as_ref()).unwrap(), 3);
    dpt
}

fn reconciler(dpt: &Arc<DProcTable>, cluster: &Arc<FakeCluster>, interval: Duration) -> Reconciler {
    let gateway: Arc<dyn Gateway> = Arc::clone(cluster) as Arc<dyn Gateway>;
    Reconciler::new(Arc::clone(dpt), gateway, interval)
}

#[test]
fn test_build_recovers_sources_from_annotations() {
    let cluster = seeded_cluster();
    let dpt = built_table(&cluster);

    assert_eq!(
        dpt.get("web", "ctxA").unwrap().source,
        Source::script(Interpreter::Python, "web.py")
    );
    assert_eq!(dpt.get("api", "ctxB").unwrap().source, Source::binary("api"));
    assert_eq!(
        dpt.get("legacy", "ctxB").unwrap().source,
        Source::script(Interpreter::Ruby, "legacy.rb")
    );
}

#[test]
fn test_build_fails_when_contexts_are_unavailable() {
    let cluster = seeded_cluster();
    cluster.set_unreachable(true);

    let dpt = DProcTable::new();
    assert!(matches!(dpt.build(cluster.as_ref()), Err(DprocError::Discovery(_))));
    assert!(dpt.is_empty());
}

#[test]
fn test_build_skips_context_that_cannot_be_listed() {
    let cluster = seeded_cluster();
    cluster.fail_on("get deployments --context=ctxB");

    let dpt = DProcTable::new();
    assert_eq!(dpt.build(cluster.as_ref()).unwrap(), 1);
    assert!(dpt.contains("web", "ctxA"));
}

#[test]
fn test_out_of_band_delete_is_evicted() {
    let cluster = seeded_cluster();
    let dpt = built_table(&cluster);
    cluster.delete_out_of_band("ctxB", "api");

    let stats = reconciler(&dpt, &cluster, Duration::from_secs(30)).reconcile_once();
    assert_eq!(stats.checked, 3);
    assert_eq!(stats.evicted, 1);
    assert!(!dpt.contains("api", "ctxB"));
    assert!(dpt.contains("web", "ctxA"));
    assert!(dpt.contains("legacy", "ctxB"));
}

#[test]
fn test_present_workloads_are_retained() {
    let cluster = seeded_cluster();
    let dpt = built_table(&cluster);

    let stats = reconciler(&dpt, &cluster, Duration::from_secs(30)).reconcile_once();
    assert_eq!(stats.evicted, 0);
    assert_eq!(dpt.len(), 3);
}

#[test]
fn test_unreachable_cluster_keeps_entries() {
    let cluster = seeded_cluster();
    let dpt = built_table(&cluster);
    cluster.set_unreachable(true);

    let stats = reconciler(&dpt, &cluster, Duration::from_secs(30)).reconcile_once();
    assert_eq!(stats.errors, 3);
    assert_eq!(stats.evicted, 0);
    assert_eq!(dpt.len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_supervised_loop_evicts_in_background() {
    let cluster = seeded_cluster();
    let dpt = built_table(&cluster);
    let reconciler = Arc::new(reconciler(&dpt, &cluster, Duration::from_millis(20)));

    let task = SupervisedTask::spawn("reconciler", move || Arc::clone(&reconciler).run());
    cluster.delete_out_of_band("ctxA", "web");

    for _ in 0..200 {
        if !dpt.contains("web", "ctxA") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(!dpt.contains("web", "ctxA"));
    assert_eq!(dpt.len(), 2);
    assert_eq!(task.restarts(), 0);
    task.shutdown().await;
}
