use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use artree_dag::ArtifactTree;
use artree_types::Identifier;
use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::config::{DispatchConfig, FailurePolicy};
use crate::discover::discover;
use crate::error::{DispatchError, DispatchResult};
use crate::task::{FileTask, TaskFailure};

// ============================================================================
// Per-Worker Statistics
// ============================================================================

/// What one worker did before the channel closed.
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Files hashed and inserted.
    pub succeeded: u64,
    /// Tasks drained without I/O after cancellation.
    pub skipped: u64,
    /// Total content bytes hashed.
    pub bytes_hashed: u64,
    pub failures: Vec<TaskFailure>,
}

// ============================================================================
// Report
// ============================================================================

/// Aggregated outcome of a dispatch, available only after every worker has
/// been joined.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub workers: usize,
    pub submitted: u64,
    pub succeeded: u64,
    pub skipped: u64,
    pub bytes_hashed: u64,
    pub failures: Vec<TaskFailure>,
}

impl DispatchReport {
    /// Every submitted task was hashed and inserted.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.skipped == 0
    }

    fn absorb(&mut self, stats: WorkerStats) {
        self.succeeded += stats.succeeded;
        self.skipped += stats.skipped;
        self.bytes_hashed += stats.bytes_hashed;
        self.failures.extend(stats.failures);
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// A worker pool scoped to one top-level operation.
///
/// Dropping the dispatcher without calling [`finish`](Self::finish) closes
/// the channel and detaches the workers; they still drain queued tasks.
pub struct Dispatcher {
    sender: Sender<FileTask>,
    handles: Vec<JoinHandle<WorkerStats>>,
    cancel: CancelToken,
    submitted: u64,
}

impl Dispatcher {
    /// Spawn the workers.
    pub fn start(config: &DispatchConfig) -> DispatchResult<Self> {
        let worker_count = config.worker_count();
        let (sender, receiver) = crossbeam_channel::bounded::<FileTask>(config.channel_capacity.max(1));
        let cancel = CancelToken::new();

        let mut handles = Vec::with_capacity(worker_count);
        for worker in 0..worker_count {
            let rx = receiver.clone();
            let token = cancel.clone();
            let policy = config.failure_policy;
            let handle = thread::Builder::new()
                .name(format!("artree-worker-{worker}"))
                .spawn(move || run_worker(worker, rx, token, policy))
                .map_err(DispatchError::Spawn)?;
            handles.push(handle);
        }
        // Only workers hold receivers, so a send fails once they are all gone.
        drop(receiver);

        debug!(workers = worker_count, capacity = config.channel_capacity, "dispatcher started");
        Ok(Self {
            sender,
            handles,
            cancel,
            submitted: 0,
        })
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.handles.len()
    }

    /// Token that stops workers from starting new files.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Enqueue one task, blocking while the channel is full.
    pub fn submit(&mut self, task: FileTask) -> DispatchResult<()> {
        self.sender.send(task).map_err(|_| DispatchError::Closed)?;
        self.submitted += 1;
        Ok(())
    }

    /// Enqueue every regular file under `root`. Returns the number of files
    /// submitted.
    ///
    /// A walk error stops enumeration and is returned; files submitted before
    /// it are still processed.
    pub fn submit_path(
        &mut self,
        root: &Path,
        tree: &Arc<ArtifactTree>,
        bom: Option<&Identifier>,
    ) -> DispatchResult<u64> {
        let mut count = 0;
        for file in discover(root) {
            let file = file?;
            self.submit(FileTask {
                path: file.path,
                declared_size: file.size,
                tree: Arc::clone(tree),
                bom: bom.cloned(),
            })?;
            count += 1;
        }
        debug!(root = %root.display(), files = count, "path submitted");
        Ok(count)
    }

    /// Close the channel and wait for every worker to drain it.
    pub fn finish(self) -> DispatchResult<DispatchReport> {
        let Self {
            sender,
            handles,
            submitted,
            ..
        } = self;
        drop(sender);

        let mut report = DispatchReport {
            workers: handles.len(),
            submitted,
            ..DispatchReport::default()
        };
        for stats in join_all(handles)? {
            report.absorb(stats);
        }

        info!(
            workers = report.workers,
            submitted = report.submitted,
            succeeded = report.succeeded,
            skipped = report.skipped,
            failed = report.failures.len(),
            "dispatch finished"
        );
        Ok(report)
    }
}

/// Join every worker, then report the first panic if any.
fn join_all(handles: Vec<JoinHandle<WorkerStats>>) -> DispatchResult<Vec<WorkerStats>> {
    let mut stats = Vec::with_capacity(handles.len());
    let mut panicked = None;
    for (worker, handle) in handles.into_iter().enumerate() {
        match handle.join() {
            Ok(s) => stats.push(s),
            Err(_) => {
                warn!(worker, "worker panicked");
                panicked.get_or_insert(worker);
            }
        }
    }
    match panicked {
        Some(worker) => Err(DispatchError::WorkerPanicked { worker }),
        None => Ok(stats),
    }
}

fn run_worker(
    worker: usize,
    rx: Receiver<FileTask>,
    cancel: CancelToken,
    policy: FailurePolicy,
) -> WorkerStats {
    let mut stats = WorkerStats::default();
    for task in rx.iter() {
        if cancel.is_cancelled() {
            stats.skipped += 1;
            continue;
        }
        match task.run() {
            Ok(identity) => {
                debug!(worker, path = %task.path.display(), identity = %identity.short_hex(), "hashed");
                stats.succeeded += 1;
                stats.bytes_hashed += task.declared_size;
            }
            Err(error) => {
                warn!(worker, path = %task.path.display(), %error, "failed to add file");
                if policy == FailurePolicy::FailFast {
                    cancel.cancel();
                }
                stats.failures.push(TaskFailure {
                    path: task.path,
                    error,
                });
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use artree_types::DigestConfig;

    fn config(workers: usize, policy: FailurePolicy) -> DispatchConfig {
        DispatchConfig {
            max_workers: Some(workers),
            channel_capacity: 2,
            failure_policy: policy,
        }
    }

    fn fixture(count: usize) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..count {
            let sub = dir.path().join(format!("d{}", i % 3));
            fs::create_dir_all(&sub).unwrap();
            fs::write(sub.join(format!("f{i}")), format!("content {i}")).unwrap();
        }
        dir
    }

    fn build(root: &Path, workers: usize) -> (Arc<ArtifactTree>, DispatchReport) {
        let tree = Arc::new(ArtifactTree::sha1());
        let cfg = config(workers, FailurePolicy::BestEffort);
        let mut dispatcher = Dispatcher::start(&cfg).unwrap();
        assert_eq!(dispatcher.workers(), cfg.worker_count());
        dispatcher.submit_path(root, &tree, None).unwrap();
        let report = dispatcher.finish().unwrap();
        assert_eq!(report.workers, cfg.worker_count());
        (tree, report)
    }

    #[test]
    fn identity_is_independent_of_worker_count() {
        let dir = fixture(40);
        let (single, report) = build(dir.path(), 1);
        assert!(report.is_success());
        assert_eq!(report.submitted, 40);
        assert_eq!(report.succeeded, 40);
        assert_eq!(single.len(), 40);

        // Worker counts are capped by the host's parallelism, so a
        // single-core machine runs every iteration with one worker.
        let available = thread::available_parallelism().map_or(1, |n| n.get());
        for workers in [2, 4, 8] {
            let (tree, report) = build(dir.path(), workers);
            assert_eq!(report.workers, workers.min(available));
            assert!(report.is_success());
            assert_eq!(tree.identity(), single.identity(), "workers = {workers}");
        }
    }

    #[test]
    fn matches_sequential_insertion() {
        let dir = fixture(10);
        let (tree, _) = build(dir.path(), 4);

        let expected = ArtifactTree::sha1();
        for i in 0..10 {
            expected
                .add_reference(format!("content {i}").as_bytes(), None)
                .unwrap();
        }
        assert_eq!(tree.serialize(), expected.serialize());
    }

    #[test]
    fn duplicate_content_is_counted_once_in_the_tree() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), "same").unwrap();
        fs::write(dir.path().join("b"), "same").unwrap();
        let (tree, report) = build(dir.path(), 2);
        assert_eq!(report.succeeded, 2);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn bom_is_attached_to_every_entry() {
        let dir = fixture(3);
        let bom = artree_crypto::HashEngine::SHA1.identity_of(b"bom");
        let tree = Arc::new(ArtifactTree::sha1());
        let mut dispatcher = Dispatcher::start(&config(2, FailurePolicy::BestEffort)).unwrap();
        dispatcher.submit_path(dir.path(), &tree, Some(&bom)).unwrap();
        dispatcher.finish().unwrap();
        assert!(tree.references().iter().all(|r| r.bom() == Some(&bom)));
    }

    #[test]
    fn failures_are_collected_without_stopping_others() {
        let dir = fixture(5);
        let tree = Arc::new(ArtifactTree::sha1());
        let mut dispatcher = Dispatcher::start(&config(3, FailurePolicy::BestEffort)).unwrap();
        dispatcher.submit_path(dir.path(), &tree, None).unwrap();
        dispatcher
            .submit(FileTask {
                path: dir.path().join("missing"),
                declared_size: 0,
                tree: Arc::clone(&tree),
                bom: None,
            })
            .unwrap();
        let mut wrong_size = dir.path().join("d0");
        wrong_size.push("f0");
        dispatcher
            .submit(FileTask {
                path: wrong_size,
                declared_size: 1000,
                tree: Arc::clone(&tree),
                bom: None,
            })
            .unwrap();

        let report = dispatcher.finish().unwrap();
        assert!(!report.is_success());
        assert_eq!(report.submitted, 7);
        assert_eq!(report.succeeded, 5);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn fail_fast_skips_after_first_failure() {
        let dir = fixture(20);
        let tree = Arc::new(ArtifactTree::sha1());
        let mut dispatcher = Dispatcher::start(&config(1, FailurePolicy::FailFast)).unwrap();
        dispatcher
            .submit(FileTask {
                path: dir.path().join("missing"),
                declared_size: 0,
                tree: Arc::clone(&tree),
                bom: None,
            })
            .unwrap();
        dispatcher.submit_path(dir.path(), &tree, None).unwrap();

        let report = dispatcher.finish().unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.skipped, 20);
        assert!(tree.is_empty());
    }

    #[test]
    fn cancelled_dispatch_skips_everything() {
        let dir = fixture(6);
        let tree = Arc::new(ArtifactTree::sha1());
        let mut dispatcher = Dispatcher::start(&config(2, FailurePolicy::BestEffort)).unwrap();
        dispatcher.cancel_token().cancel();
        dispatcher.submit_path(dir.path(), &tree, None).unwrap();

        let report = dispatcher.finish().unwrap();
        assert_eq!(report.skipped, 6);
        assert!(!report.is_success());
        assert!(tree.is_empty());
    }

    #[test]
    fn panic_is_reported_after_every_worker_is_joined() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::time::Duration;

        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let handles = vec![
            thread::spawn(|| -> WorkerStats { panic!("worker failure") }),
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                flag.store(true, Ordering::SeqCst);
                WorkerStats::default()
            }),
        ];

        let err = join_all(handles).unwrap_err();
        assert!(matches!(err, DispatchError::WorkerPanicked { worker: 0 }));
        assert!(finished.load(Ordering::SeqCst));
    }

    #[test]
    fn walk_error_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let tree = Arc::new(ArtifactTree::new(DigestConfig::Sha256));
        let mut dispatcher = Dispatcher::start(&DispatchConfig::default()).unwrap();
        let err = dispatcher
            .submit_path(&dir.path().join("nope"), &tree, None)
            .unwrap_err();
        assert!(matches!(err, DispatchError::Walk { .. }));
        let report = dispatcher.finish().unwrap();
        assert_eq!(report.submitted, 0);
        assert!(report.is_success());
    }
}
