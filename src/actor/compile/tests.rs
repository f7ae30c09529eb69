use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::{Semaphore, mpsc};

use super::CompileActor;
use crate::actor::messages::{WorkerEvent, WorkerRequest};
use crate::engine::{CompilerEngine, EngineHandle};
use crate::error::{CompileFailure, InitError};
use crate::vfs::{FileContent, Snapshot, Vfs};

/// Scripted compiler engine: optional gates on init/compile, a log of
/// compiled main-file contents, and an in-flight high-water mark.
#[derive(Default)]
struct MockCompiler {
    fail_init: bool,
    init_gate: Option<Arc<Semaphore>>,
    compile_gate: Option<Arc<Semaphore>>,
    /// First N compiles fail with scripted diagnostics.
    fail_compiles: usize,
    files: FxHashMap<String, String>,
    compiled: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl CompilerEngine for MockCompiler {
    async fn init(&mut self) -> Result<(), InitError> {
        if let Some(gate) = &self.init_gate {
            let _ = gate.acquire().await;
        }
        if self.fail_init {
            Err(InitError("wasm module missing".into()))
        } else {
            Ok(())
        }
    }

    fn reset_files(&mut self) {
        self.files.clear();
    }

    fn add_file(&mut self, path: &str, content: &FileContent) {
        self.files.insert(
            path.to_string(),
            String::from_utf8_lossy(content.as_bytes()).into_owned(),
        );
    }

    async fn compile(&mut self, main_path: &str) -> Result<Vec<u8>, CompileFailure> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(gate) = &self.compile_gate {
            let _ = gate.acquire().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_compiles > 0 {
            self.fail_compiles -= 1;
            return Err(CompileFailure::new(vec![
                "error: scripted failure".into(),
                format!("  --> {main_path}:1:1"),
            ]));
        }

        let content = self.files[main_path].clone();
        self.compiled.lock().push(content.clone());
        Ok(content.into_bytes())
    }
}

struct Pipeline {
    request_tx: mpsc::Sender<WorkerRequest>,
    event_rx: mpsc::Receiver<WorkerEvent>,
}

fn spawn_actor(engine: MockCompiler) -> Pipeline {
    let (request_tx, request_rx) = mpsc::channel(32);
    let (event_tx, event_rx) = mpsc::channel(32);
    let handle: EngineHandle<dyn CompilerEngine> = EngineHandle::new(Box::new(engine));
    tokio::spawn(CompileActor::new(request_rx, event_tx, handle).run());
    Pipeline {
        request_tx,
        event_rx,
    }
}

fn snapshot(content: &str) -> Snapshot {
    Vfs::single("main.typ", content).snapshot()
}

async fn sync(pipeline: &Pipeline, content: &str) {
    pipeline
        .request_tx
        .send(WorkerRequest::SyncVfs(snapshot(content)))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_ready_then_compile_round_trip() {
    let engine = MockCompiler::default();
    let mut pipeline = spawn_actor(engine);

    assert_eq!(pipeline.event_rx.recv().await, Some(WorkerEvent::Ready));

    sync(&pipeline, "= Hello").await;
    match pipeline.event_rx.recv().await {
        Some(WorkerEvent::Rendered(artifact)) => {
            assert_eq!(artifact.as_bytes(), b"= Hello");
        }
        other => panic!("expected Rendered, got {other:?}"),
    }
}

#[tokio::test]
async fn test_coalescing_law_compiles_first_and_last_only() {
    let compiled = Arc::new(Mutex::new(Vec::new()));
    let gate = Arc::new(Semaphore::new(0));
    let engine = MockCompiler {
        compile_gate: Some(Arc::clone(&gate)),
        compiled: Arc::clone(&compiled),
        ..Default::default()
    };
    let mut pipeline = spawn_actor(engine);
    assert_eq!(pipeline.event_rx.recv().await, Some(WorkerEvent::Ready));

    // Burst of five snapshots while the first compile is blocked
    for content in ["s1", "s2", "s3", "s4", "s5"] {
        sync(&pipeline, content).await;
    }
    gate.add_permits(5);

    assert!(matches!(
        pipeline.event_rx.recv().await,
        Some(WorkerEvent::Rendered(_))
    ));
    assert!(matches!(
        pipeline.event_rx.recv().await,
        Some(WorkerEvent::Rendered(_))
    ));

    // s2..s4 were superseded before the first compile finished and must
    // never have reached the engine
    assert_eq!(*compiled.lock(), vec!["s1".to_string(), "s5".to_string()]);
}

#[tokio::test]
async fn test_single_flight_under_burst() {
    let max_in_flight = Arc::new(AtomicUsize::new(0));
    let engine = MockCompiler {
        max_in_flight: Arc::clone(&max_in_flight),
        ..Default::default()
    };
    let mut pipeline = spawn_actor(engine);
    assert_eq!(pipeline.event_rx.recv().await, Some(WorkerEvent::Ready));

    for i in 0..20 {
        sync(&pipeline, &format!("v{i}")).await;
    }

    // Drain until the latest version came back
    loop {
        match pipeline.event_rx.recv().await {
            Some(WorkerEvent::Rendered(artifact)) if artifact.as_bytes() == b"v19" => break,
            Some(_) => continue,
            None => panic!("actor died before converging"),
        }
    }

    assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_pre_ready_snapshots_are_dropped() {
    let compiled = Arc::new(Mutex::new(Vec::new()));
    let init_gate = Arc::new(Semaphore::new(0));
    let engine = MockCompiler {
        init_gate: Some(Arc::clone(&init_gate)),
        compiled: Arc::clone(&compiled),
        ..Default::default()
    };
    let mut pipeline = spawn_actor(engine);

    // Engine still initializing: these must be dropped, not queued
    sync(&pipeline, "early1").await;
    sync(&pipeline, "early2").await;
    tokio::task::yield_now().await;

    init_gate.add_permits(1);
    assert_eq!(pipeline.event_rx.recv().await, Some(WorkerEvent::Ready));

    // The reseed after Ready is the first thing that compiles
    sync(&pipeline, "seed").await;
    assert!(matches!(
        pipeline.event_rx.recv().await,
        Some(WorkerEvent::Rendered(_))
    ));
    assert_eq!(*compiled.lock(), vec!["seed".to_string()]);
}

#[tokio::test]
async fn test_init_failure_is_terminal() {
    let engine = MockCompiler {
        fail_init: true,
        ..Default::default()
    };
    let mut pipeline = spawn_actor(engine);

    match pipeline.event_rx.recv().await {
        Some(WorkerEvent::Failed(message)) => {
            assert!(message.contains("initialization failed"));
        }
        other => panic!("expected Failed, got {other:?}"),
    }

    // Every snapshot after a failed init fails immediately, no retry
    for _ in 0..2 {
        sync(&pipeline, "anything").await;
        assert!(matches!(
            pipeline.event_rx.recv().await,
            Some(WorkerEvent::Failed(_))
        ));
    }
}

#[tokio::test]
async fn test_missing_main_file_rejected_before_engine() {
    let compiled = Arc::new(Mutex::new(Vec::new()));
    let engine = MockCompiler {
        compiled: Arc::clone(&compiled),
        ..Default::default()
    };
    let mut pipeline = spawn_actor(engine);
    assert_eq!(pipeline.event_rx.recv().await, Some(WorkerEvent::Ready));

    let mut vfs = Vfs::new();
    let orphan = vfs.update("lib.typ", "x");
    pipeline
        .request_tx
        .send(WorkerRequest::SyncVfs(orphan))
        .await
        .unwrap();

    match pipeline.event_rx.recv().await {
        Some(WorkerEvent::Failed(message)) => assert!(message.contains("not found")),
        other => panic!("expected Failed, got {other:?}"),
    }
    assert!(compiled.lock().is_empty());
}

#[tokio::test]
async fn test_idle_recovery_after_compile_failure() {
    let compiled = Arc::new(Mutex::new(Vec::new()));
    let engine = MockCompiler {
        fail_compiles: 1,
        compiled: Arc::clone(&compiled),
        ..Default::default()
    };
    let mut pipeline = spawn_actor(engine);
    assert_eq!(pipeline.event_rx.recv().await, Some(WorkerEvent::Ready));

    sync(&pipeline, "broken").await;
    match pipeline.event_rx.recv().await {
        Some(WorkerEvent::Failed(message)) => {
            assert!(message.contains("scripted failure"));
        }
        other => panic!("expected Failed, got {other:?}"),
    }

    // No manual reset: the next snapshot compiles normally
    sync(&pipeline, "fixed").await;
    assert!(matches!(
        pipeline.event_rx.recv().await,
        Some(WorkerEvent::Rendered(_))
    ));
    assert_eq!(*compiled.lock(), vec!["fixed".to_string()]);
}

#[tokio::test]
async fn test_files_registered_under_absolute_paths() {
    let compiled = Arc::new(Mutex::new(Vec::new()));
    let engine = MockCompiler {
        compiled: Arc::clone(&compiled),
        ..Default::default()
    };
    let mut pipeline = spawn_actor(engine);
    assert_eq!(pipeline.event_rx.recv().await, Some(WorkerEvent::Ready));

    let mut vfs = Vfs::single("main.typ", "#include \"lib.typ\"");
    let snapshot = vfs.update("lib.typ", "= Lib");
    pipeline
        .request_tx
        .send(WorkerRequest::SyncVfs(snapshot))
        .await
        .unwrap();

    // The engine resolves "/main.typ": absolute registration worked
    match pipeline.event_rx.recv().await {
        Some(WorkerEvent::Rendered(artifact)) => {
            assert_eq!(artifact.as_bytes(), b"#include \"lib.typ\"");
        }
        other => panic!("expected Rendered, got {other:?}"),
    }
}
