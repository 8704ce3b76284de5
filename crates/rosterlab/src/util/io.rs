//! I/O utility functions

use std::fs;
use std::io;
use std::path::Path;

/// Write content to a file using write-then-rename.
///
/// The content lands in a `.yaml.tmp` sibling first and is renamed over the
/// target.
pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let temp_path = path.with_extension("yaml.tmp");
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}
