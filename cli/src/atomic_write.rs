use std::io::Write as _;
use std::path::Path;

use anyhow::Context;
use tempfile::NamedTempFile;

/// How [`write_atomic_text`] treats a file that already exists at the target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overwrite {
    Replace,
    /// Leave the existing file alone and report `false`.
    KeepExisting,
}

/// Write `contents` through a temp file in the same directory, then move it into place.
///
/// Returns whether the target was written. A trailing newline is added when missing.
pub fn write_atomic_text(path: &Path, contents: &str, overwrite: Overwrite) -> anyhow::Result<bool> {
    let Some(parent) = path.parent() else {
        anyhow::bail!("invalid path for atomic write: {}", path.display());
    };
    std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;

    let mut tmp = NamedTempFile::new_in(parent).context("create temp file")?;
    tmp.write_all(contents.as_bytes())
        .context("write temp file")?;
    if !contents.ends_with('\n') {
        tmp.write_all(b"\n").context("write temp newline")?;
    }
    tmp.flush().context("flush temp file")?;

    let persisted = match overwrite {
        Overwrite::Replace => tmp.persist(path),
        Overwrite::KeepExisting => tmp.persist_noclobber(path),
    };
    match persisted {
        Ok(_) => Ok(true),
        Err(err)
            if overwrite == Overwrite::KeepExisting
                && err.error.kind() == std::io::ErrorKind::AlreadyExists =>
        {
            Ok(false)
        }
        Err(err) => Err(anyhow::Error::new(err.error)
            .context(format!("persist file to {}", path.display()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn adds_trailing_newline_and_creates_parent_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".zoea").join("config.toml");

        let written = write_atomic_text(&path, "[swarm]", Overwrite::Replace).expect("write");

        assert!(written);
        let contents = std::fs::read_to_string(&path).expect("read");
        assert_eq!(contents, "[swarm]\n");
    }

    #[test]
    fn keep_existing_does_not_clobber() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "# mine\n").expect("seed");

        let written = write_atomic_text(&path, "[swarm]\n", Overwrite::KeepExisting).expect("write");

        assert!(!written);
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "# mine\n");
        let leftovers = std::fs::read_dir(dir.path()).expect("list").count();
        assert_eq!(leftovers, 1);
    }
}
