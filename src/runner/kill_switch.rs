//! File-based kill switch

use std::path::{Path, PathBuf};

/// Halts trading while a sentinel file exists
///
/// Operators engage it with `touch <path>` and release it by deleting the
/// file; no restart is needed.
#[derive(Debug, Clone)]
pub struct KillSwitch {
    path: PathBuf,
}

impl KillSwitch {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the sentinel file is present
    pub fn is_engaged(&self) -> bool {
        self.path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engaged_while_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let switch = KillSwitch::new(dir.path().join("KILL"));
        assert!(!switch.is_engaged());

        std::fs::write(switch.path(), b"").unwrap();
        assert!(switch.is_engaged());

        std::fs::remove_file(switch.path()).unwrap();
        assert!(!switch.is_engaged());
    }
}
