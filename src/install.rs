//! Package installer - turns a staged install tree into a deploy package.
//!
//! An [`InstallCreator`] is bound to a staging root and the output directory
//! of one deployment mode. It selects parts of the staged tree with anchored
//! glob patterns, prepares them in a private directory, then copies the
//! prepared content to the target.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::error::StepError;
use crate::fs_utils::{copy_file, copy_symlink};
use crate::output;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// What a call to [`InstallCreator::convert_dir_to_package`] packaged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSummary {
    /// Packaged files and symlinks, relative to the package root
    pub files: Vec<PathBuf>,
    /// Matched entries left out because they held no files
    pub skipped: Vec<PathBuf>,
}

impl PackageSummary {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Installer for one deployment mode.
pub struct InstallCreator {
    cwd: PathBuf,
    target_dir: PathBuf,
    content: TempDir,
}

impl InstallCreator {
    /// Create an installer reading from `cwd` and writing to `target_dir`.
    pub fn new(cwd: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Result<Self, StepError> {
        let content = tempfile::Builder::new()
            .prefix("ctrl-agent-pkg-")
            .tempdir()?;
        Ok(Self {
            cwd: cwd.into(),
            target_dir: target_dir.into(),
            content,
        })
    }

    /// Directory holding the prepared package content.
    pub fn content_dir(&self) -> &Path {
        self.content.path()
    }

    /// Package the parts of `path` selected by `include_patterns`.
    ///
    /// Patterns are anchored at `path` (a leading `/` is optional) and `*`
    /// never crosses a `/`, so `/lib*` selects top-level `lib`, `lib64`, ...
    /// Multi-component patterns such as `/share/doc` select nested entries.
    /// A selected entry brings its whole subtree along; a selected symlink is
    /// packaged as the link itself and never followed.
    ///
    /// With `skip_empty`, selected entries without files are left out and
    /// patterns without matches are ignored. Without it, empty directories
    /// are kept and a pattern without matches is an error.
    pub fn convert_dir_to_package(
        &self,
        path: &Path,
        include_patterns: &[&str],
        skip_empty: bool,
    ) -> Result<PackageSummary, StepError> {
        let root = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        };
        if !root.is_dir() {
            return Err(StepError::MissingDirectory(root));
        }

        let mut summary = PackageSummary::default();

        for raw in include_patterns {
            let pattern = Pattern::new(raw.trim_start_matches('/'))?;
            let mut matched = false;

            let mut walker = WalkDir::new(&root)
                .min_depth(1)
                .sort_by_file_name()
                .into_iter();
            while let Some(entry) = walker.next() {
                let entry = entry?;
                let rel = entry
                    .path()
                    .strip_prefix(&root)
                    .map_err(|_| StepError::MissingDirectory(entry.path().to_path_buf()))?
                    .to_path_buf();

                if !pattern.matches_path_with(&rel, MATCH_OPTIONS) {
                    continue;
                }
                matched = true;
                if entry.file_type().is_dir() {
                    walker.skip_current_dir();
                }

                let files = self.copy_subtree(entry.path(), &rel, !skip_empty)?;
                if files.is_empty() && skip_empty {
                    output::detail(&format!("skip {} (empty)", rel.display()));
                    summary.skipped.push(rel);
                } else {
                    summary.files.extend(files);
                }
            }

            if !matched {
                if !skip_empty {
                    return Err(StepError::NoMatch(raw.to_string()));
                }
                output::detail(&format!("skip {} (no match)", raw));
            }
        }

        summary.files.sort();
        summary.files.dedup();
        summary.skipped.sort();
        summary.skipped.dedup();
        Ok(summary)
    }

    /// Copy the prepared content into the target directory.
    ///
    /// The target directory is created even when nothing was prepared.
    /// Returns the number of files copied.
    pub fn self_copy_to_target(&self) -> Result<usize, StepError> {
        std::fs::create_dir_all(&self.target_dir)?;

        let mut copied = 0;
        for entry in WalkDir::new(self.content.path()).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            let rel = entry
                .path()
                .strip_prefix(self.content.path())
                .map_err(|_| StepError::MissingDirectory(entry.path().to_path_buf()))?;
            let dest = self.target_dir.join(rel);

            let file_type = entry.file_type();
            if file_type.is_dir() {
                std::fs::create_dir_all(&dest)?;
            } else if file_type.is_symlink() {
                copy_symlink(entry.path(), &dest)?;
                copied += 1;
            } else {
                copy_file(entry.path(), &dest)?;
                copied += 1;
            }
        }

        output::detail(&format!(
            "{} file(s) -> {}",
            copied,
            self.target_dir.display()
        ));
        Ok(copied)
    }

    /// Copy `src` (file, symlink or directory) to `rel` inside the content dir.
    fn copy_subtree(&self, src: &Path, rel: &Path, keep_dirs: bool) -> Result<Vec<PathBuf>, StepError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(src)
            .follow_root_links(false)
            .sort_by_file_name()
        {
            let entry = entry?;
            let sub = entry
                .path()
                .strip_prefix(src)
                .map_err(|_| StepError::MissingDirectory(entry.path().to_path_buf()))?;
            let rel_path = if sub.as_os_str().is_empty() {
                rel.to_path_buf()
            } else {
                rel.join(sub)
            };
            let dest = self.content.path().join(&rel_path);

            let file_type = entry.file_type();
            if file_type.is_dir() {
                if keep_dirs {
                    std::fs::create_dir_all(&dest)?;
                }
            } else if file_type.is_symlink() {
                copy_symlink(entry.path(), &dest)?;
                files.push(rel_path);
            } else {
                copy_file(entry.path(), &dest)?;
                files.push(rel_path);
            }
        }

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn staged_tree() -> TempDir {
        let stage = TempDir::new().unwrap();
        write(stage.path(), "include/asio_wrapper/socket.hpp", "#pragma once");
        write(stage.path(), "include/asio_wrapper/timer.hpp", "#pragma once");
        write(stage.path(), "lib/libasio_wrapper.a", "ar");
        write(stage.path(), "lib/cmake/asio_wrapper/config.cmake", "set()");
        write(stage.path(), "cmake/asio_wrapper-config.cmake", "set()");
        write(stage.path(), "share/doc/README", "docs");
        stage
    }

    #[test]
    fn test_dev_patterns_select_lib_and_include() {
        let stage = staged_tree();
        let out = TempDir::new().unwrap();
        let installer = InstallCreator::new(stage.path(), out.path().join("dev")).unwrap();

        let summary = installer
            .convert_dir_to_package(stage.path(), &["/lib*", "/include*"], true)
            .unwrap();

        assert_eq!(
            summary.files,
            vec![
                PathBuf::from("include/asio_wrapper/socket.hpp"),
                PathBuf::from("include/asio_wrapper/timer.hpp"),
                PathBuf::from("lib/cmake/asio_wrapper/config.cmake"),
                PathBuf::from("lib/libasio_wrapper.a"),
            ]
        );
        assert!(summary.skipped.is_empty());
        assert!(!installer.content_dir().join("cmake").exists());
        assert!(!installer.content_dir().join("share").exists());
    }

    #[test]
    fn test_star_does_not_cross_separator() {
        let stage = staged_tree();
        let out = TempDir::new().unwrap();
        let installer = InstallCreator::new(stage.path(), out.path()).unwrap();

        // "*cmake*" must not reach lib/cmake
        let summary = installer
            .convert_dir_to_package(stage.path(), &["/*cmake*"], true)
            .unwrap();
        assert_eq!(
            summary.files,
            vec![PathBuf::from("cmake/asio_wrapper-config.cmake")]
        );
    }

    #[test]
    fn test_nested_pattern() {
        let stage = staged_tree();
        let out = TempDir::new().unwrap();
        let installer = InstallCreator::new(stage.path(), out.path()).unwrap();

        let summary = installer
            .convert_dir_to_package(stage.path(), &["/share/doc"], true)
            .unwrap();
        assert_eq!(summary.files, vec![PathBuf::from("share/doc/README")]);
    }

    #[test]
    fn test_relative_path_resolved_against_cwd() {
        let stage = staged_tree();
        let out = TempDir::new().unwrap();
        let installer = InstallCreator::new(stage.path(), out.path()).unwrap();

        let summary = installer
            .convert_dir_to_package(Path::new("."), &["/include*"], true)
            .unwrap();
        assert_eq!(summary.files.len(), 2);
    }

    #[test]
    fn test_skip_empty_leaves_out_empty_match() {
        let stage = TempDir::new().unwrap();
        write(stage.path(), "include/foo.h", "int foo();");
        std::fs::create_dir_all(stage.path().join("lib/pkgconfig")).unwrap();
        let out = TempDir::new().unwrap();
        let installer = InstallCreator::new(stage.path(), out.path().join("dev")).unwrap();

        let summary = installer
            .convert_dir_to_package(stage.path(), &["/lib*", "/include*"], true)
            .unwrap();

        assert_eq!(summary.files, vec![PathBuf::from("include/foo.h")]);
        assert_eq!(summary.skipped, vec![PathBuf::from("lib")]);
        assert!(!installer.content_dir().join("lib").exists());
    }

    #[test]
    fn test_without_skip_empty_keeps_empty_dirs() {
        let stage = TempDir::new().unwrap();
        write(stage.path(), "include/foo.h", "int foo();");
        std::fs::create_dir_all(stage.path().join("lib/pkgconfig")).unwrap();
        let out = TempDir::new().unwrap();
        let installer = InstallCreator::new(stage.path(), out.path()).unwrap();

        let summary = installer
            .convert_dir_to_package(stage.path(), &["/lib*", "/include*"], false)
            .unwrap();
        assert!(installer.content_dir().join("lib/pkgconfig").is_dir());
        // kept, so not reported as skipped
        assert!(summary.skipped.is_empty());
        assert_eq!(summary.files, vec![PathBuf::from("include/foo.h")]);
    }

    #[test]
    fn test_no_match_without_skip_empty_fails() {
        let stage = TempDir::new().unwrap();
        write(stage.path(), "include/foo.h", "int foo();");
        let out = TempDir::new().unwrap();
        let installer = InstallCreator::new(stage.path(), out.path()).unwrap();

        let err = installer
            .convert_dir_to_package(stage.path(), &["/lib*"], false)
            .unwrap_err();
        assert!(matches!(err, StepError::NoMatch(ref p) if p == "/lib*"));

        // Same pattern is fine when empty matches are skipped
        let summary = installer
            .convert_dir_to_package(stage.path(), &["/lib*"], true)
            .unwrap();
        assert!(summary.is_empty());
    }

    #[test]
    fn test_invalid_pattern() {
        let stage = TempDir::new().unwrap();
        let installer = InstallCreator::new(stage.path(), stage.path().join("out")).unwrap();
        let result = installer.convert_dir_to_package(stage.path(), &["/lib[*"], true);
        assert!(matches!(result, Err(StepError::Pattern(_))));
    }

    #[test]
    fn test_missing_root() {
        let stage = TempDir::new().unwrap();
        let installer = InstallCreator::new(stage.path(), stage.path().join("out")).unwrap();
        let result = installer.convert_dir_to_package(&stage.path().join("gone"), &["/lib*"], true);
        assert!(matches!(result, Err(StepError::MissingDirectory(_))));
    }

    #[test]
    fn test_self_copy_to_target() {
        let stage = staged_tree();
        let out = TempDir::new().unwrap();
        let target = out.path().join("deploy/dev");
        let installer = InstallCreator::new(stage.path(), &target).unwrap();

        installer
            .convert_dir_to_package(stage.path(), &["/include*"], true)
            .unwrap();
        let copied = installer.self_copy_to_target().unwrap();

        assert_eq!(copied, 2);
        assert_eq!(
            std::fs::read_to_string(target.join("include/asio_wrapper/socket.hpp")).unwrap(),
            "#pragma once"
        );
        assert!(!target.join("lib").exists());
    }

    #[test]
    fn test_self_copy_without_content_creates_empty_target() {
        let stage = staged_tree();
        let out = TempDir::new().unwrap();
        let target = out.path().join("deploy/run");
        let installer = InstallCreator::new(stage.path(), &target).unwrap();

        assert_eq!(installer.self_copy_to_target().unwrap(), 0);
        assert!(target.is_dir());
        assert_eq!(std::fs::read_dir(&target).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_preserved() {
        let stage = TempDir::new().unwrap();
        write(stage.path(), "lib/libfoo.so.1", "elf");
        std::os::unix::fs::symlink("libfoo.so.1", stage.path().join("lib/libfoo.so")).unwrap();
        let out = TempDir::new().unwrap();
        let installer = InstallCreator::new(stage.path(), out.path().join("dev")).unwrap();

        let summary = installer
            .convert_dir_to_package(stage.path(), &["/lib*"], true)
            .unwrap();
        assert_eq!(summary.files.len(), 2);

        installer.self_copy_to_target().unwrap();
        let link = out.path().join("dev/lib/libfoo.so");
        assert_eq!(std::fs::read_link(link).unwrap(), PathBuf::from("libfoo.so.1"));
    }

    #[cfg(unix)]
    #[test]
    fn test_top_level_symlink_copied_as_link() {
        let stage = TempDir::new().unwrap();
        write(stage.path(), "lib/libfoo.a", "ar");
        std::os::unix::fs::symlink("lib", stage.path().join("lib64")).unwrap();
        let out = TempDir::new().unwrap();
        let installer = InstallCreator::new(stage.path(), out.path().join("dev")).unwrap();

        let summary = installer
            .convert_dir_to_package(stage.path(), &["/lib*"], true)
            .unwrap();

        assert_eq!(
            summary.files,
            vec![PathBuf::from("lib/libfoo.a"), PathBuf::from("lib64")]
        );
        assert_eq!(
            std::fs::read_to_string(stage.path().join("lib/libfoo.a")).unwrap(),
            "ar"
        );

        installer.self_copy_to_target().unwrap();
        let link = out.path().join("dev/lib64");
        assert_eq!(std::fs::read_link(&link).unwrap(), PathBuf::from("lib"));
        assert_eq!(
            std::fs::read_to_string(out.path().join("dev/lib/libfoo.a")).unwrap(),
            "ar"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_symlink_target_untouched() {
        let outside = TempDir::new().unwrap();
        write(outside.path(), "libsys.a", "sys");
        let stage = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), stage.path().join("lib64")).unwrap();
        let out = TempDir::new().unwrap();
        let installer = InstallCreator::new(stage.path(), out.path().join("dev")).unwrap();

        let summary = installer
            .convert_dir_to_package(stage.path(), &["/lib*"], true)
            .unwrap();

        assert_eq!(summary.files, vec![PathBuf::from("lib64")]);
        assert_eq!(
            std::fs::read_to_string(outside.path().join("libsys.a")).unwrap(),
            "sys"
        );
        assert_eq!(
            std::fs::read_link(installer.content_dir().join("lib64")).unwrap(),
            outside.path()
        );
    }

    #[test]
    fn test_content_dir_removed_on_drop() {
        let stage = TempDir::new().unwrap();
        let installer = InstallCreator::new(stage.path(), stage.path().join("out")).unwrap();
        let content = installer.content_dir().to_path_buf();
        assert!(content.is_dir());
        drop(installer);
        assert!(!content.exists());
    }
}
