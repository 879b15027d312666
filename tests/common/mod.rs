//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_file("in.yaml", codeplugs::MINIMAL);
//!     fixture.command().arg("fill").assert().failure();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::codeplugs;
    pub use super::TestFixture;
}

/// Codeplug YAML snippets for testing.
#[allow(dead_code)]
pub mod codeplugs {
    /// A codeplug with one zone and settings that must pass through.
    pub const MINIMAL: &str = r#"version: 0.12.0
settings:
  introLine1: dmrfill
contacts:
  - dmr:
      id: cont1
      name: Worldwide
      ring: false
      type: GroupCall
      number: 91
groupLists: []
channels: []
zones:
  - id: zone1
    name: Home
    A: []
"#;

    /// Not a codeplug at all.
    pub const INVALID_YAML: &str = "zones: [unterminated";
}

/// A temporary directory holding codeplugs and a private response cache.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The cache directory used by commands from [`TestFixture::command`].
    #[allow(dead_code)]
    pub fn cache_dir(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("cache")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// A `dmrfill` command running in this fixture's directory, with the
    /// cache redirected into it and no inherited log settings.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dmrfill");
        cmd.current_dir(self.path())
            .env("DMRFILL_CACHE", self.cache_dir())
            .env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_file() {
        let fixture = TestFixture::new().with_file("in.yaml", codeplugs::MINIMAL);
        assert!(fixture.path().join("in.yaml").exists());
    }

    #[test]
    fn test_codeplugs_parse_as_expected() {
        serde_yaml::from_str::<serde_yaml::Value>(codeplugs::MINIMAL)
            .expect("MINIMAL should be valid YAML");
        assert!(serde_yaml::from_str::<serde_yaml::Value>(codeplugs::INVALID_YAML).is_err());
    }
}
