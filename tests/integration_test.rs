use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use fanscan::{search, Entry, EntryIter, Enumerator, FanscanError, FsEnumerator};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Create a temporary directory tree for testing.
///
/// Structure:
/// ```
/// tmp/
///   a.log        (5 bytes)
///   b.txt        (6 bytes)
///   c.LOG        (7 bytes)
///   sub/
///     d.log      (8 bytes)
/// ```
fn setup_test_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    fs::write(root.join("a.log"), "aaaaa").unwrap();
    fs::write(root.join("b.txt"), "bbbbbb").unwrap();
    fs::write(root.join("c.LOG"), "ccccccc").unwrap();

    let sub = root.join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("d.log"), "dddddddd").unwrap();

    dir
}

/// A wider, deeper tree: `width` directories per level, `depth` levels, three
/// files of distinct sizes in every directory.
fn setup_big_tree(width: usize, depth: usize) -> tempfile::TempDir {
    fn fill(dir: &Path, width: usize, depth: usize) {
        for (i, ext) in ["log", "txt", "dat"].iter().enumerate() {
            let body = vec![b'x'; (i + 1) * 10 + depth];
            fs::write(dir.join(format!("file{i}.{ext}")), body).unwrap();
        }
        if depth == 0 {
            return;
        }
        for w in 0..width {
            let child = dir.join(format!("d{w}"));
            fs::create_dir(&child).unwrap();
            fill(&child, width, depth - 1);
        }
    }

    let dir = tempfile::tempdir().unwrap();
    fill(dir.path(), width, depth);
    dir
}

/// What walkdir sees under `root`, for cross-checking.
struct Oracle {
    files: u64,
    dirs:  u64,
    bytes: u64,
}

fn oracle(root: &Path) -> Oracle {
    let mut o = Oracle { files: 0, dirs: 0, bytes: 0 };
    for e in walkdir::WalkDir::new(root).min_depth(1) {
        let e = e.unwrap();
        if e.file_type().is_dir() {
            o.dirs += 1;
        } else {
            o.files += 1;
            o.bytes += e.metadata().unwrap().len();
        }
    }
    o
}

/// Writer shared with the test so the sink's output can be inspected.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes).lines().map(str::to_string).collect()
    }
}

/// Filesystem enumerator that refuses one directory by name.
struct Refusing(&'static str);

impl Enumerator for Refusing {
    fn enumerate(&self, dir: &Path) -> Result<EntryIter<'_>, FanscanError> {
        if dir.file_name().map(|n| n == self.0).unwrap_or(false) {
            return Err(FanscanError::PermissionDenied(dir.to_path_buf()));
        }
        FsEnumerator.enumerate(dir)
    }
}

fn as_set(paths: Vec<PathBuf>) -> HashSet<PathBuf> {
    paths.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn finds_log_files_case_insensitively() {
    let dir = setup_test_dir();
    let root = dir.path();
    let results = search()
        .root(root)
        .pattern("*.log")
        .collect_paths(true)
        .run()
        .unwrap();

    assert_eq!(results.stats.files_scanned, 4);
    assert_eq!(results.stats.directories_scanned, 1);
    assert_eq!(results.stats.match_count, 3);
    assert_eq!(results.stats.total_bytes_scanned, 26);
    assert_eq!(results.stats.match_bytes_total, 20);
    assert_eq!(
        as_set(results.paths),
        as_set(vec![root.join("a.log"), root.join("c.LOG"), root.join("sub").join("d.log")])
    );
}

#[test]
fn counts_match_walkdir() {
    let dir = setup_big_tree(3, 3);
    let expected = oracle(dir.path());

    let results = search()
        .root(dir.path())
        .pattern("*")
        .threads(4)
        .run()
        .unwrap();

    assert_eq!(results.stats.files_scanned, expected.files);
    assert_eq!(results.stats.directories_scanned, expected.dirs);
    assert_eq!(results.stats.total_bytes_scanned, expected.bytes);
    assert_eq!(results.stats.match_count, expected.files);
    assert_eq!(results.stats.match_bytes_total, expected.bytes);
}

#[test]
fn matched_set_equals_filtered_walk() {
    let dir = setup_big_tree(2, 4);

    let expected: HashSet<PathBuf> = walkdir::WalkDir::new(dir.path())
        .min_depth(1)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            name.ends_with(".log") || name.ends_with(".dat")
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    let results = search()
        .root(dir.path())
        .patterns(["*.log", "*.dat"])
        .collect_paths(true)
        .run()
        .unwrap();

    // Each match reported exactly once
    assert_eq!(results.paths.len(), expected.len());
    assert_eq!(as_set(results.paths), expected);
}

#[test]
fn output_gets_one_line_per_match() {
    let dir = setup_big_tree(3, 2);
    let out = SharedBuf::default();

    let results = search()
        .root(dir.path())
        .pattern("file?.txt")
        .batch_size(4)
        .output(out.clone())
        .run()
        .unwrap();

    let lines = out.lines();
    assert_eq!(lines.len() as u64, results.stats.match_count);
    assert_eq!(results.lines_written, results.stats.match_count);
    assert!(lines.iter().all(|l| l.ends_with("file1.txt")));
    let unique: HashSet<&String> = lines.iter().collect();
    assert_eq!(unique.len(), lines.len());
}

#[test]
fn repeated_runs_agree() {
    let dir = setup_big_tree(3, 2);
    let run = || {
        search()
            .root(dir.path())
            .patterns(["*.log", "d1"])
            .include_dirs(false)
            .collect_paths(true)
            .run()
            .unwrap()
    };

    let first = run();
    let second = run();
    assert_eq!(first.stats, second.stats);
    assert_eq!(as_set(first.paths), as_set(second.paths));
}

#[test]
fn refused_directory_only_loses_its_subtree() {
    let dir = setup_test_dir();
    let root = dir.path();
    fs::create_dir(root.join("locked")).unwrap();
    fs::write(root.join("locked").join("hidden.log"), "zz").unwrap();

    let results = search()
        .root(root)
        .enumerator(Refusing("locked"))
        .pattern("*.log")
        .collect_paths(true)
        .collect_errors(true)
        .run()
        .unwrap();

    // locked/ itself is seen, nothing inside it is
    assert_eq!(results.stats.directories_scanned, 2);
    assert_eq!(results.stats.directories_skipped, 1);
    assert_eq!(results.stats.files_scanned, 4);
    assert_eq!(results.stats.match_count, 3);
    assert!(!results.paths.iter().any(|p| p.ends_with("hidden.log")));

    assert_eq!(results.errors.len(), 1);
    assert!(results.errors[0].is_recoverable());
    assert_eq!(results.errors[0].path(), Some(&root.join("locked")));
}

#[cfg(unix)]
#[test]
fn unreadable_directory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = setup_test_dir();
    let root = dir.path();
    let locked = root.join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("secret.log"), "s").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Running as root ignores permission bits; nothing to assert then.
    let enforced = fs::read_dir(&locked).is_err();

    let results = search()
        .root(root)
        .pattern("*.log")
        .collect_errors(true)
        .run();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    let results = results.unwrap();

    if enforced {
        assert_eq!(results.stats.directories_skipped, 1);
        assert_eq!(results.stats.files_scanned, 4);
        assert_eq!(results.stats.match_count, 3);
        assert!(matches!(results.errors[0], FanscanError::PermissionDenied(_)));
    } else {
        assert_eq!(results.stats.match_count, 4);
    }
    assert_eq!(results.stats.directories_scanned, 2);
}

#[cfg(target_os = "linux")]
#[test]
fn non_utf8_names_are_scanned_and_reported_verbatim() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let bad_dir = root.join(OsStr::from_bytes(b"bad\xff"));
    fs::create_dir(&bad_dir).unwrap();
    fs::write(bad_dir.join("inner.log"), "12").unwrap();
    fs::write(root.join(OsStr::from_bytes(b"f\xfe.log")), "345").unwrap();

    let results = search()
        .root(root)
        .pattern("*.log")
        .collect_paths(true)
        .collect_errors(true)
        .run()
        .unwrap();

    assert_eq!(results.stats.files_scanned, 2);
    assert_eq!(results.stats.directories_scanned, 1);
    assert_eq!(results.stats.directories_skipped, 0);
    assert_eq!(results.stats.match_count, 2);
    assert_eq!(results.stats.match_bytes_total, 5);
    assert!(results.errors.is_empty());
    for path in &results.paths {
        assert!(path.exists(), "{} does not exist", path.display());
    }
    assert!(results
        .paths
        .iter()
        .any(|p| p.as_os_str().as_bytes().ends_with(b"/f\xfe.log")));
}

#[test]
fn include_dirs_reports_directories_by_full_path() {
    let dir = setup_test_dir();
    let root = dir.path();
    fs::create_dir(root.join("logs")).unwrap();
    fs::write(root.join("logs").join("x.bin"), "1").unwrap();

    // A bare leaf pattern never matches a full path
    let results = search()
        .root(root)
        .pattern("logs")
        .include_dirs(true)
        .run()
        .unwrap();
    assert_eq!(results.stats.match_count, 0);

    // Last path component contains "log"
    let results = search()
        .root(root)
        .pattern(r"log[^/\\]*$")
        .regex(true)
        .include_dirs(true)
        .collect_paths(true)
        .run()
        .unwrap();

    let expected = as_set(vec![
        root.join("a.log"),
        root.join("c.LOG"),
        root.join("sub").join("d.log"),
        root.join("logs"),
    ]);
    assert_eq!(as_set(results.paths), expected);
    assert_eq!(results.stats.match_count, 4);
    assert_eq!(results.stats.match_bytes_total, 20);
}

#[test]
fn regex_mode_matches_unanchored() {
    let dir = setup_test_dir();
    let results = search()
        .root(dir.path())
        .pattern(r"^[ab]\.")
        .regex(true)
        .run()
        .unwrap();

    assert_eq!(results.stats.match_count, 2);
}

#[test]
fn bad_regex_fails_before_scanning() {
    let dir = setup_test_dir();
    let err = search()
        .root(dir.path())
        .pattern("(")
        .regex(true)
        .run()
        .unwrap_err();

    assert!(err.is_configuration());
    assert!(matches!(err, FanscanError::InvalidPattern { ref pattern, .. } if pattern == "("));
}

#[test]
fn configuration_errors() {
    let dir = setup_test_dir();

    assert!(matches!(
        search().root(dir.path()).run(),
        Err(FanscanError::NoPatterns)
    ));
    assert!(matches!(
        search().root(dir.path()).pattern("*").threads(0).run(),
        Err(FanscanError::InvalidThreadCount(0))
    ));
    assert!(matches!(
        search().root(dir.path()).pattern("*").batch_size(0).run(),
        Err(FanscanError::InvalidBatchSize(0))
    ));
    assert!(matches!(
        search().root(dir.path().join("missing")).pattern("*").run(),
        Err(FanscanError::InvalidSource(_))
    ));
}

#[test]
fn bounded_queue_still_delivers_everything() {
    let dir = setup_big_tree(3, 3);
    let expected = oracle(dir.path());

    let results = search()
        .root(dir.path())
        .pattern("*")
        .queue_capacity(2)
        .batch_size(3)
        .collect_paths(true)
        .run()
        .unwrap();

    assert_eq!(results.paths.len() as u64, expected.files);
}

#[test]
fn virtual_tree_via_custom_enumerator() {
    struct Virtual;

    impl Enumerator for Virtual {
        fn enumerate(&self, dir: &Path) -> Result<EntryIter<'_>, FanscanError> {
            let entries = match dir.to_str() {
                Some("/v") => vec![Entry::dir("."), Entry::dir(".."), Entry::dir("a"), Entry::file("top.cmd", 1)],
                Some("/v/a") => vec![Entry::file("setup.cmd", 2), Entry::file("setup.cmdx", 4)],
                _ => return Err(FanscanError::NotFound(dir.to_path_buf())),
            };
            Ok(Box::new(entries.into_iter().map(Ok::<_, FanscanError>)))
        }
    }

    let results = search()
        .root("/v")
        .enumerator(Virtual)
        .pattern("*.cmd")
        .collect_paths(true)
        .run()
        .unwrap();

    assert_eq!(results.stats.directories_scanned, 1);
    assert_eq!(results.stats.files_scanned, 3);
    assert_eq!(results.stats.match_bytes_total, 3);
    assert_eq!(
        as_set(results.paths),
        as_set(vec![PathBuf::from("/v/top.cmd"), PathBuf::from("/v/a/setup.cmd")])
    );
}
