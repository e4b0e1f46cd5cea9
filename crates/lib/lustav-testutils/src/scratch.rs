use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Creates an empty directory below the system temp dir that is unique to this process and
/// call.
pub fn scratch_dir(name: &str) -> PathBuf {
    let unique = COUNTER.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "lustav_{}_{}_{}",
        name,
        std::process::id(),
        unique
    ));
    if path.exists() {
        fs::remove_dir_all(&path).expect("failed to clear scratch directory");
    }
    fs::create_dir_all(&path).expect("failed to create scratch directory");
    path
}
