/// End-to-end scanner integration tests.
///
/// These exercise the real scan path (root validation, one-level listing,
/// jwalk folder sizing, classification, filtering and aggregation) against
/// a temporary filesystem, including the background-thread entry point
/// and its progress channel.
use dirsleuth_core::analysis::{Category, CompressionProfile, OptimizationReport};
use dirsleuth_core::model::{DateRange, SearchQuery, SizePreset, SizeRange};
use dirsleuth_core::scanner::cache::SizeCache;
use dirsleuth_core::scanner::{ScanOptions, ScanRequest, PROGRESS_CHANNEL_CAPACITY};
use dirsleuth_core::{CategoryTable, FilterCriteria, ScanProgress, Scanner};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const GB: u64 = 1_073_741_824;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn write_bytes(path: &Path, n: usize) {
    let mut f = fs::File::create(path).unwrap();
    f.write_all(&vec![0u8; n]).unwrap();
}

/// A 2 GiB sparse file: correct length, almost no disk usage.
fn sparse_file(path: &Path, len: u64) {
    let f = fs::File::create(path).unwrap();
    f.set_len(len).unwrap();
}

/// ```text
/// root/
///   movie.mp4  (2 GiB, sparse)
///   Notes/     (empty)
/// ```
fn movie_and_notes() -> TempDir {
    let tmp = TempDir::new().expect("failed to create temp dir");
    sparse_file(&tmp.path().join("movie.mp4"), 2 * GB);
    fs::create_dir(tmp.path().join("Notes")).unwrap();
    tmp
}

/// ```text
/// root/
///   alpha/
///     a.txt   (100 bytes)
///     b.rs    (200 bytes)
///   beta/
///     c.png   (300 bytes)
///   d.zip     (400 bytes)
/// ```
fn build_test_tree(root: &Path) {
    let alpha = root.join("alpha");
    let beta = root.join("beta");
    fs::create_dir_all(&alpha).unwrap();
    fs::create_dir_all(&beta).unwrap();

    write_bytes(&alpha.join("a.txt"), 100);
    write_bytes(&alpha.join("b.rs"), 200);
    write_bytes(&beta.join("c.png"), 300);
    write_bytes(&root.join("d.zip"), 400);
}

fn names(report: &dirsleuth_core::ScanReport) -> Vec<&str> {
    report.entries.iter().map(|e| e.name.as_str()).collect()
}

// ── Scan results ─────────────────────────────────────────────────────────────

#[test]
fn movie_and_empty_folder() {
    let tmp = movie_and_notes();
    let report = Scanner::default().scan(tmp.path(), &FilterCriteria::none());

    assert_eq!(names(&report), ["Notes", "movie.mp4"]);
    let s = &report.summary;
    assert_eq!(s.total_items, 2);
    assert_eq!(s.file_count, 1);
    assert_eq!(s.folder_count, 1);
    assert_eq!(s.error_count, 0);
    assert_eq!(s.total_size_bytes, 2 * GB);
    assert_eq!(report.entries[1].category.category(), Some(Category::Videos));
    assert_eq!(report.entries[0].size_bytes, 0);
}

#[test]
fn documents_filter_keeps_only_folders() {
    let tmp = movie_and_notes();
    let criteria =
        FilterCriteria::none().with_types(&[Category::Documents], "", CategoryTable::builtin());
    let report = Scanner::default().scan(tmp.path(), &criteria);

    assert_eq!(names(&report), ["Notes"]);
    assert_eq!(report.summary.total_size_bytes, 0);
}

#[test]
fn large_preset_admits_the_movie() {
    let tmp = movie_and_notes();
    let criteria = FilterCriteria::none().with_size_range(SizePreset::VeryLarge.range());
    let report = Scanner::default().scan(tmp.path(), &criteria);
    assert_eq!(report.summary.file_count, 1);

    let criteria = FilterCriteria::none().with_size_range(SizePreset::Small.range());
    let report = Scanner::default().scan(tmp.path(), &criteria);
    assert_eq!(report.summary.file_count, 0);
    assert_eq!(report.summary.folder_count, 1);
}

#[test]
fn recursive_folder_sizes() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());
    let report = Scanner::default().scan(tmp.path(), &FilterCriteria::none());

    assert_eq!(names(&report), ["alpha", "beta", "d.zip"]);
    assert_eq!(report.entries[0].size_bytes, 300);
    assert_eq!(report.entries[1].size_bytes, 300);
    assert_eq!(report.entries[2].size_bytes, 400);
    assert_eq!(report.summary.total_size_bytes, 1_000);
    assert_eq!(report.summary.folders_size_bytes, 600);
    assert_eq!(report.summary.files_size_bytes, 400);
}

#[test]
fn empty_root() {
    let tmp = TempDir::new().unwrap();
    let report = Scanner::default().scan(tmp.path(), &FilterCriteria::none());
    assert!(report.entries.is_empty());
    assert_eq!(report.summary.total_items, 0);
    assert!(report.summary.largest_file.is_none());
}

#[test]
fn nonexistent_root_gives_one_error_entry() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nonexistent");
    let report = Scanner::default().scan(&missing, &FilterCriteria::none());

    assert_eq!(report.entries.len(), 1);
    let entry = &report.entries[0];
    assert!(entry.is_error());
    assert!(entry.name.starts_with("Error: "));
    assert_eq!(entry.full_path, missing.to_string_lossy());
    assert_eq!(report.summary.error_count, 1);
    assert_eq!(report.summary.total_size_bytes, 0);
}

#[test]
fn file_root_gives_one_error_entry() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("plain.txt");
    write_bytes(&file, 10);
    let report = Scanner::default().scan(&file, &FilterCriteria::none());
    assert!(report.is_failed());
    assert_eq!(report.entries.len(), 1);
}

/// Strip every permission bit from `dir`. Returns `false` when the mode
/// is not enforced (running as root), in which case the caller skips.
#[cfg(unix)]
fn lock_dir(dir: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read_dir(dir).is_ok() {
        unlock_dir(dir);
        return false;
    }
    true
}

#[cfg(unix)]
fn unlock_dir(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(unix)]
#[test]
fn unreadable_root_gives_one_permission_error() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("Private");
    fs::create_dir(&root).unwrap();
    write_bytes(&root.join("secret.txt"), 10);
    if !lock_dir(&root) {
        return;
    }

    let report = Scanner::default().scan(&root, &FilterCriteria::none());
    unlock_dir(&root);

    assert_eq!(report.entries.len(), 1);
    let entry = &report.entries[0];
    assert!(entry.is_error());
    assert!(entry.name.contains("permission denied"), "{}", entry.name);
    assert_eq!(report.summary.error_count, 1);
    assert_eq!(report.summary.total_size_bytes, 0);
}

#[cfg(unix)]
#[test]
fn unreadable_subfolder_contributes_nothing() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("Data");
    let locked = data.join("locked");
    fs::create_dir_all(&locked).unwrap();
    write_bytes(&data.join("readable.bin"), 100);
    write_bytes(&locked.join("hidden.bin"), 50);
    if !lock_dir(&locked) {
        return;
    }

    let serial = Scanner::default().scan(tmp.path(), &FilterCriteria::none());
    let parallel = Scanner::new(
        Arc::new(CategoryTable::builtin().clone()),
        ScanOptions {
            parallel_sizing: true,
            size_cache: None,
        },
    )
    .scan(tmp.path(), &FilterCriteria::none());
    unlock_dir(&locked);

    for report in [&serial, &parallel] {
        assert_eq!(names(report), ["Data"]);
        assert_eq!(report.entries[0].size_bytes, 100);
        assert_eq!(report.summary.error_count, 0);
    }
}

#[test]
fn error_entry_survives_restrictive_filters() {
    let tmp = TempDir::new().unwrap();
    let criteria = FilterCriteria::none()
        .with_extensions([".pdf"])
        .with_size_range(SizeRange::new(5.0, 6.0))
        .with_search(SearchQuery::new("zzz"));
    let report = Scanner::default().scan(&tmp.path().join("gone"), &criteria);
    assert_eq!(report.summary.error_count, 1);
}

#[test]
fn system_reserved_children_are_skipped() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("$RECYCLE.BIN")).unwrap();
    write_bytes(&tmp.path().join("$RECYCLE.BIN/junk.bin"), 1_000);
    write_bytes(&tmp.path().join("Thumbs.db"), 10);
    write_bytes(&tmp.path().join("kept.txt"), 10);

    let report = Scanner::default().scan(tmp.path(), &FilterCriteria::none());
    assert_eq!(names(&report), ["kept.txt"]);
    assert_eq!(report.summary.total_size_bytes, 10);
}

#[test]
fn scanning_twice_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());
    let scanner = Scanner::default();
    let first = scanner.scan(tmp.path(), &FilterCriteria::none());
    let second = scanner.scan(tmp.path(), &FilterCriteria::none());
    assert_eq!(first, second);
}

#[test]
fn filtering_never_increases_totals() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());
    write_bytes(&tmp.path().join("notes.txt"), 50);
    let scanner = Scanner::default();
    let all = scanner.scan(tmp.path(), &FilterCriteria::none());

    let filters = [
        FilterCriteria::none().with_extensions(["txt"]),
        FilterCriteria::none().with_search(SearchQuery::new("a")),
        FilterCriteria::none().with_size_range(SizeRange::new(0.0, 0.0000003)),
        FilterCriteria::none().with_date_range(DateRange::default()),
    ];
    for criteria in &filters {
        let filtered = scanner.scan(tmp.path(), criteria);
        assert!(filtered.summary.total_items <= all.summary.total_items, "{criteria}");
        assert!(
            filtered.summary.total_size_bytes <= all.summary.total_size_bytes,
            "{criteria}"
        );
    }
}

#[test]
fn search_is_case_insensitive_by_default() {
    let tmp = TempDir::new().unwrap();
    write_bytes(&tmp.path().join("MyDocument.pdf"), 1);
    write_bytes(&tmp.path().join("other.pdf"), 1);
    let criteria = FilterCriteria::none().with_search(SearchQuery::new("mydoc"));
    let report = Scanner::default().scan(tmp.path(), &criteria);
    assert_eq!(names(&report), ["MyDocument.pdf"]);

    let exact = FilterCriteria::none()
        .with_search(SearchQuery::new("mydocument.pdf").exact_match(true));
    assert_eq!(Scanner::default().scan(tmp.path(), &exact).entries.len(), 1);

    let sensitive = FilterCriteria::none()
        .with_search(SearchQuery::new("mydoc").case_sensitive(true));
    assert!(Scanner::default().scan(tmp.path(), &sensitive).entries.is_empty());
}

#[test]
fn todays_files_match_last_days() {
    let tmp = TempDir::new().unwrap();
    write_bytes(&tmp.path().join("fresh.txt"), 1);
    let criteria = FilterCriteria::none().with_date_range(DateRange::last_days_from_now(7));
    let report = Scanner::default().scan(tmp.path(), &criteria);
    assert_eq!(report.summary.file_count, 1);
}

// ── Options ──────────────────────────────────────────────────────────────────

#[test]
fn memoized_scan_reuses_folder_sizes() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());
    let cache = Arc::new(SizeCache::new());
    let scanner = Scanner::new(
        Arc::new(CategoryTable::builtin().clone()),
        ScanOptions {
            parallel_sizing: false,
            size_cache: Some(cache.clone()),
        },
    );

    let first = scanner.scan(tmp.path(), &FilterCriteria::none());
    assert_eq!(cache.len(), 2);
    let second = scanner.scan(tmp.path(), &FilterCriteria::none());
    assert_eq!(first, second);
    assert_eq!(cache.stats().0, 2);
}

#[test]
fn parallel_sizing_matches_serial() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());
    let serial = Scanner::default().scan(tmp.path(), &FilterCriteria::none());
    let parallel = Scanner::new(
        Arc::new(CategoryTable::builtin().clone()),
        ScanOptions {
            parallel_sizing: true,
            size_cache: None,
        },
    )
    .scan(tmp.path(), &FilterCriteria::none());
    assert_eq!(serial, parallel);
}

#[test]
fn batch_preserves_request_order() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    build_test_tree(a.path());
    write_bytes(&b.path().join("only.txt"), 7);

    let requests = [
        ScanRequest::new(a.path(), FilterCriteria::none()),
        ScanRequest::new(b.path().join("missing"), FilterCriteria::none()),
        ScanRequest::new(b.path(), FilterCriteria::none()),
    ];
    let reports = Scanner::default().scan_batch(&requests);

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].summary.total_size_bytes, 1_000);
    assert!(reports[1].is_failed());
    assert_eq!(names(&reports[2]), ["only.txt"]);
}

#[test]
fn savings_over_a_real_scan() {
    let tmp = movie_and_notes();
    let report = Scanner::default().scan(tmp.path(), &FilterCriteria::none());
    let opt = OptimizationReport::build(&report.entries, CompressionProfile::builtin());

    assert_eq!(opt.file_count, 1);
    assert_eq!(opt.folder_count, 1);
    assert!(!opt.rows.is_empty());
    assert!(opt.rows.iter().all(|r| r.file_name == "movie.mp4"));
}

// ── Cancellation and progress ────────────────────────────────────────────────

#[test]
fn cancel_between_children_discards_the_result() {
    let tmp = TempDir::new().unwrap();
    for i in 0..20 {
        write_bytes(&tmp.path().join(format!("file{i:02}.bin")), 10);
    }
    let cancel = AtomicBool::new(false);
    let mut seen = 0;
    let out = Scanner::default().scan_with_control(
        tmp.path(),
        &FilterCriteria::none(),
        &cancel,
        |done, _, _| {
            seen = done + 1;
            if done == 2 {
                cancel.store(true, Ordering::Relaxed);
            }
        },
    );
    assert!(out.is_none());
    assert_eq!(seen, 3);
}

#[test]
fn background_scan_completes_with_report() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());

    let handle = Scanner::default()
        .start(tmp.path().to_path_buf(), FilterCriteria::none())
        .expect("failed to spawn scanner");

    let deadline = std::time::Instant::now() + Duration::from_secs(30);
    let mut updates = 0;
    let report = loop {
        assert!(
            std::time::Instant::now() < deadline,
            "scanner did not complete within 30 seconds"
        );
        match handle.progress_rx.try_recv() {
            Ok(ScanProgress::Complete { report, .. }) => break report,
            Ok(ScanProgress::Cancelled) => panic!("scan was unexpectedly cancelled"),
            Ok(ScanProgress::Update { children_total, .. }) => {
                assert_eq!(children_total, 3);
                updates += 1;
            }
            Err(crossbeam_channel::TryRecvError::Empty) => {
                std::thread::sleep(Duration::from_millis(5));
            }
            Err(crossbeam_channel::TryRecvError::Disconnected) => {
                panic!("scanner channel disconnected before Complete was sent");
            }
        }
    };
    assert_eq!(updates, 3);
    assert_eq!(report.summary.total_size_bytes, 1_000);
}

#[test]
fn background_scan_cancel_always_terminates() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());

    let handle = Scanner::default()
        .start(tmp.path().to_path_buf(), FilterCriteria::none())
        .expect("failed to spawn scanner");
    // The scan may finish before the flag is read; either terminal
    // message is acceptable.
    handle.cancel();
    assert!(handle.is_cancelled());

    let deadline = std::time::Instant::now() + Duration::from_secs(30);
    let mut received_terminal = false;
    while std::time::Instant::now() < deadline {
        match handle.progress_rx.try_recv() {
            Ok(msg) if msg.is_terminal() => {
                received_terminal = true;
                break;
            }
            Ok(_) => continue,
            Err(crossbeam_channel::TryRecvError::Empty) => {
                std::thread::sleep(Duration::from_millis(5));
            }
            Err(crossbeam_channel::TryRecvError::Disconnected) => break,
        }
    }
    assert!(received_terminal, "scanner must send Cancelled or Complete within 30 s");
}

#[test]
fn wait_returns_the_report_of_a_failed_root() {
    let tmp = TempDir::new().unwrap();
    let handle = Scanner::default()
        .start(tmp.path().join("nope"), FilterCriteria::none())
        .expect("failed to spawn scanner");
    let report = handle.wait().expect("failed roots complete, they do not cancel");
    assert!(report.is_failed());
}

const _: () = assert!(
    PROGRESS_CHANNEL_CAPACITY > 0,
    "PROGRESS_CHANNEL_CAPACITY must be > 0"
);
