//! Scanner behaviour against in-memory capabilities and the real filesystem

use ledgerly_domain::traits::{DocumentProcessor, ProcessingLedger};
use ledgerly_domain::ProcessOutcome;
use ledgerly_store::SqliteLedger;
use ledgerly_watcher::{
    InProcessRunner, LocalFs, RunReport, Scanner, WatchConfig, WatchFs, WatchRunner, WatcherError,
};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn watch(id: &str, dir: &Path, executable: &str) -> WatchConfig {
    WatchConfig {
        watch_id: id.to_string(),
        watch_path: dir.join("in"),
        file_pattern: "*.pdf".to_string(),
        executable_path: PathBuf::from(executable),
        processed_path: dir.join("done"),
    }
}

#[derive(Default)]
struct MemoryLedger {
    rows: HashSet<(String, String)>,
    fail_reads: bool,
}

impl ProcessingLedger for MemoryLedger {
    type Error = String;

    fn is_processed(&self, watch_id: &str, file_path: &str) -> Result<bool, String> {
        if self.fail_reads {
            return Err("database is locked".to_string());
        }
        Ok(self.rows.contains(&(watch_id.to_string(), file_path.to_string())))
    }

    fn record_processed(&mut self, watch_id: &str, file_path: &str) -> Result<(), String> {
        self.rows.insert((watch_id.to_string(), file_path.to_string()));
        Ok(())
    }
}

/// Directory listing keyed by watch path; moves are recorded, not performed
#[derive(Default)]
struct MemoryFs {
    dirs: HashMap<PathBuf, Vec<PathBuf>>,
    moved: RefCell<Vec<PathBuf>>,
    fail_moves: bool,
}

impl MemoryFs {
    fn with_files(dir: &Path, names: &[&str]) -> Self {
        let mut fs = Self::default();
        fs.dirs
            .insert(dir.to_path_buf(), names.iter().map(|n| dir.join(n)).collect());
        fs
    }
}

impl WatchFs for MemoryFs {
    fn list_matching(&self, dir: &Path, _pattern: &str) -> io::Result<Vec<PathBuf>> {
        self.dirs
            .get(dir)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such directory"))
    }

    fn move_into(&self, file: &Path, dest_dir: &Path) -> io::Result<PathBuf> {
        if self.fail_moves {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        self.moved.borrow_mut().push(file.to_path_buf());
        Ok(dest_dir.join(file.file_name().unwrap()))
    }
}

/// Exit codes by file name; anything unlisted succeeds
#[derive(Default)]
struct ScriptedRunner {
    exit_codes: HashMap<String, i32>,
    calls: Vec<PathBuf>,
}

impl WatchRunner for ScriptedRunner {
    fn run(&mut self, _watch: &WatchConfig, file: &Path) -> RunReport {
        self.calls.push(file.to_path_buf());
        let name = file.file_name().unwrap().to_string_lossy().into_owned();
        let exit_code = self.exit_codes.get(&name).copied().unwrap_or(0);
        RunReport {
            exit_code,
            output: format!("exit {}", exit_code),
        }
    }
}

#[test]
fn test_second_scan_is_idempotent() {
    let w = watch("checking", Path::new("/data"), "unused");
    let fs = MemoryFs::with_files(&w.watch_path, &["a.pdf", "b.pdf"]);
    let mut ledger = MemoryLedger::default();
    let mut runner = ScriptedRunner::default();
    let scanner = Scanner::new(false);

    let first = scanner.scan(&[w.clone()], &mut ledger, &fs, &mut runner).unwrap();
    assert_eq!(first.processed, 2);
    assert_eq!(first.errors, 0);

    let second = scanner.scan(&[w], &mut ledger, &fs, &mut runner).unwrap();
    assert_eq!(second.discovered, 2);
    assert_eq!(second.skipped, 2);
    assert_eq!(second.processed, 0);
    assert_eq!(runner.calls.len(), 2);
}

#[test]
fn test_failed_file_is_retried() {
    let w = watch("checking", Path::new("/data"), "unused");
    let fs = MemoryFs::with_files(&w.watch_path, &["a.pdf", "bad.pdf"]);
    let mut ledger = MemoryLedger::default();
    let mut runner = ScriptedRunner::default();
    runner.exit_codes.insert("bad.pdf".to_string(), 1);
    let scanner = Scanner::new(false);

    let metrics = scanner.scan(&[w.clone()], &mut ledger, &fs, &mut runner).unwrap();
    assert_eq!(metrics.processed, 1);
    assert_eq!(metrics.errors, 1);
    assert_eq!(fs.moved.borrow().len(), 1);
    assert!(!ledger.is_processed("checking", "bad.pdf").unwrap());

    runner.exit_codes.clear();
    let metrics = scanner.scan(&[w], &mut ledger, &fs, &mut runner).unwrap();
    assert_eq!(metrics.processed, 1);
    assert_eq!(metrics.skipped, 1);
    assert!(ledger.is_processed("checking", "bad.pdf").unwrap());
}

#[test]
fn test_store_and_config_failures_leave_files_in_place() {
    let w = watch("checking", Path::new("/data"), "unused");
    let fs = MemoryFs::with_files(&w.watch_path, &["locked.pdf", "misconfigured.pdf", "killed.pdf"]);
    let mut ledger = MemoryLedger::default();
    let mut runner = ScriptedRunner::default();
    runner.exit_codes.insert("locked.pdf".to_string(), 2);
    runner.exit_codes.insert("misconfigured.pdf".to_string(), 3);
    runner.exit_codes.insert("killed.pdf".to_string(), -1);

    let metrics = Scanner::new(false)
        .scan(&[w], &mut ledger, &fs, &mut runner)
        .unwrap();
    assert_eq!(metrics.errors, 3);
    assert_eq!(metrics.processed, 0);
    assert!(fs.moved.borrow().is_empty());
    assert!(ledger.rows.is_empty());
}

#[test]
fn test_ledger_is_namespaced_by_watch() {
    let a = watch("checking", Path::new("/data"), "unused");
    let mut b = watch("visa", Path::new("/data"), "unused");
    b.processed_path = PathBuf::from("/data/visa-done");
    let fs = MemoryFs::with_files(&a.watch_path, &["stmt.pdf"]);
    let mut ledger = MemoryLedger::default();
    ledger.record_processed("checking", "stmt.pdf").unwrap();
    let mut runner = ScriptedRunner::default();

    let metrics = Scanner::new(false)
        .scan(&[a, b], &mut ledger, &fs, &mut runner)
        .unwrap();
    assert_eq!(metrics.skipped, 1);
    assert_eq!(metrics.processed, 1);
}

#[test]
fn test_dry_run_touches_nothing() {
    let w = watch("checking", Path::new("/data"), "unused");
    let fs = MemoryFs::with_files(&w.watch_path, &["a.pdf", "b.pdf"]);
    let mut ledger = MemoryLedger::default();
    ledger.record_processed("checking", "a.pdf").unwrap();
    let mut runner = ScriptedRunner::default();

    let metrics = Scanner::new(true)
        .scan(&[w], &mut ledger, &fs, &mut runner)
        .unwrap();
    assert_eq!(metrics.eligible, 1);
    assert_eq!(metrics.would_process, vec![PathBuf::from("/data/in/b.pdf")]);
    assert_eq!(metrics.processed, 0);
    assert!(runner.calls.is_empty());
    assert!(fs.moved.borrow().is_empty());
    assert_eq!(ledger.rows.len(), 1);
}

#[test]
fn test_unlistable_watch_does_not_stop_others() {
    let missing = watch("gone", Path::new("/nowhere"), "unused");
    let present = watch("checking", Path::new("/data"), "unused");
    let fs = MemoryFs::with_files(&present.watch_path, &["a.pdf"]);
    let mut ledger = MemoryLedger::default();
    let mut runner = ScriptedRunner::default();

    let metrics = Scanner::new(false)
        .scan(&[missing, present], &mut ledger, &fs, &mut runner)
        .unwrap();
    assert_eq!(metrics.watches_scanned, 2);
    assert_eq!(metrics.errors, 1);
    assert_eq!(metrics.processed, 1);
}

#[test]
fn test_move_failure_writes_no_ledger_row() {
    let w = watch("checking", Path::new("/data"), "unused");
    let mut fs = MemoryFs::with_files(&w.watch_path, &["a.pdf"]);
    fs.fail_moves = true;
    let mut ledger = MemoryLedger::default();
    let mut runner = ScriptedRunner::default();

    let metrics = Scanner::new(false)
        .scan(&[w], &mut ledger, &fs, &mut runner)
        .unwrap();
    assert_eq!(metrics.errors, 1);
    assert_eq!(metrics.processed, 0);
    assert!(ledger.rows.is_empty());
}

#[test]
fn test_ledger_failure_aborts_scan() {
    let w = watch("checking", Path::new("/data"), "unused");
    let fs = MemoryFs::with_files(&w.watch_path, &["a.pdf"]);
    let mut ledger = MemoryLedger {
        fail_reads: true,
        ..Default::default()
    };
    let mut runner = ScriptedRunner::default();

    let result = Scanner::new(false).scan(&[w], &mut ledger, &fs, &mut runner);
    assert!(matches!(result, Err(WatcherError::Ledger(_))));
    assert!(runner.calls.is_empty());
}

struct CountingProcessor {
    seen: Vec<PathBuf>,
}

impl DocumentProcessor for CountingProcessor {
    fn process(&mut self, file: &Path) -> ProcessOutcome {
        self.seen.push(file.to_path_buf());
        ProcessOutcome::Success {
            inserted: 3,
            skipped: 0,
        }
    }
}

#[test]
fn test_in_process_runner_drives_scan() {
    let w = watch("checking", Path::new("/data"), "unused");
    let fs = MemoryFs::with_files(&w.watch_path, &["a.pdf"]);
    let mut ledger = MemoryLedger::default();
    let mut runner = InProcessRunner::new(CountingProcessor { seen: Vec::new() });

    let metrics = Scanner::new(false)
        .scan(&[w], &mut ledger, &fs, &mut runner)
        .unwrap();
    assert_eq!(metrics.processed, 1);
    assert_eq!(runner.processor().seen, vec![PathBuf::from("/data/in/a.pdf")]);
}

#[cfg(unix)]
#[test]
fn test_successful_file_moved_and_recorded() {
    let dir = TempDir::new().unwrap();
    let w = watch("checking", dir.path(), "true");
    fs::create_dir(&w.watch_path).unwrap();
    fs::write(w.watch_path.join("stmt1.pdf"), "%PDF").unwrap();
    fs::write(w.watch_path.join("notes.txt"), "ignore me").unwrap();

    let mut ledger = SqliteLedger::new(dir.path().join("watcher.db")).unwrap();
    let metrics = Scanner::new(false)
        .scan(&[w.clone()], &mut ledger, &LocalFs, &mut ledgerly_watcher::ExternalRunner)
        .unwrap();

    assert_eq!(metrics.processed, 1);
    assert!(!w.watch_path.join("stmt1.pdf").exists());
    assert!(w.processed_path.join("stmt1.pdf").exists());
    assert!(w.watch_path.join("notes.txt").exists());

    let rows = ledger.list_processed("checking").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].file_path, "stmt1.pdf");
}

#[cfg(unix)]
#[test]
fn test_failing_processor_leaves_file_in_place() {
    let dir = TempDir::new().unwrap();
    let w = watch("checking", dir.path(), "false");
    fs::create_dir(&w.watch_path).unwrap();
    let original = b"%PDF-1.4\n\x00\xff statement body".to_vec();
    fs::write(w.watch_path.join("stmt1.pdf"), &original).unwrap();

    let mut ledger = SqliteLedger::new(dir.path().join("watcher.db")).unwrap();
    let metrics = Scanner::new(false)
        .scan(&[w.clone()], &mut ledger, &LocalFs, &mut ledgerly_watcher::ExternalRunner)
        .unwrap();

    assert_eq!(metrics.errors, 1);
    assert_eq!(fs::read(w.watch_path.join("stmt1.pdf")).unwrap(), original);
    assert!(!w.processed_path.exists());
    assert!(ledger.list_processed("checking").unwrap().is_empty());
}
