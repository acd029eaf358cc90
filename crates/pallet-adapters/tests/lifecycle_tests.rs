//! End-to-end lifecycle tests against real directories and the in-memory
//! filesystem.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pallet_adapters::{DirectoryCache, LocalFilesystem, MemoryFilesystem};
use pallet_core::prelude::*;
use pallet_core::application::{ApplicationError, IntegrityIssue};
use tempfile::TempDir;

// ============================================================================
// Fixtures
// ============================================================================

struct Workspace {
    _dir: TempDir,
    host: PathBuf,
    cache: PathBuf,
}

impl Workspace {
    /// An `ecms` checkout with headers, a stray text file and test sources.
    fn ecms() -> Self {
        let dir = TempDir::new().unwrap();
        let host = dir.path().join("ecms");
        let cache = dir.path().join("cache");

        write(&host, "src/EC/foo.hpp", "#pragma once\nstruct Foo {};\n");
        write(&host, "src/EC/sub/bar.hpp", "#pragma once\nstruct Bar {};\n");
        write(&host, "src/EC/readme.txt", "docs\n");
        write(&host, "tests/helper.hpp", "#pragma once\n");
        write(&host, "tests/main.cpp", "int main() {}\n");

        Self {
            _dir: dir,
            host,
            cache,
        }
    }

    fn controller(&self) -> LifecycleController {
        LifecycleController::new(
            Arc::new(LocalFilesystem::new()),
            Arc::new(DirectoryCache::new(&self.cache)),
        )
    }

    fn package_root(&self) -> PathBuf {
        self.cache.join("ecms/1.0/package")
    }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn ecms(no_copy_source: bool) -> Recipe {
    Recipe::builder()
        .name("ecms")
        .version("1.0")
        .exports_sources(["src/EC/*"])
        .no_copy_source(no_copy_source)
        .layout(ArtifactLayout::header_only(["src"]).unwrap())
        .build()
        .unwrap()
}

fn rel(p: &str) -> RelativePath {
    RelativePath::try_new(p).unwrap()
}

fn files_under(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir(root)
        .into_iter()
        .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    files.sort();
    files
}

fn walkdir(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                out.push(path);
            }
        }
    }
    out
}

#[allow(clippy::permissions_set_readonly_false)]
fn make_writable(path: &Path) {
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_readonly(false);
    fs::set_permissions(path, perms).unwrap();
}

// ============================================================================
// Staging engine
// ============================================================================

#[test]
fn staging_selects_headers_at_any_depth() {
    let ws = Workspace::ecms();
    let dest = ws.cache.join("staged");
    let engine = StagingEngine::new(Arc::new(LocalFilesystem::new()));

    let staged = engine
        .stage(
            &ws.host.join("src"),
            &dest,
            &PatternSet::parse(["*.hpp"]).unwrap(),
        )
        .unwrap();

    assert_eq!(staged.len(), 2);
    assert!(staged.contains(&rel("EC/foo.hpp")));
    assert!(staged.contains(&rel("EC/sub/bar.hpp")));
    assert_eq!(files_under(&dest), ["EC/foo.hpp", "EC/sub/bar.hpp"]);
}

#[test]
fn staging_twice_is_idempotent() {
    let ws = Workspace::ecms();
    let dest = ws.cache.join("staged");
    let engine = StagingEngine::new(Arc::new(LocalFilesystem::new()));
    let patterns = PatternSet::parse(["*.hpp"]).unwrap();

    engine.stage(&ws.host, &dest, &patterns).unwrap();
    let first: Vec<_> = files_under(&dest)
        .into_iter()
        .map(|f| (fs::read(dest.join(&f)).unwrap(), f))
        .collect();

    engine.stage(&ws.host, &dest, &patterns).unwrap();
    let second: Vec<_> = files_under(&dest)
        .into_iter()
        .map(|f| (fs::read(dest.join(&f)).unwrap(), f))
        .collect();

    assert_eq!(first, second);
}

#[test]
fn staging_is_additive() {
    let ws = Workspace::ecms();
    let dest = ws.cache.join("staged");
    write(&dest, "unrelated.txt", "keep me");

    let engine = StagingEngine::new(Arc::new(LocalFilesystem::new()));
    engine
        .stage(&ws.host, &dest, &PatternSet::parse(["*.hpp"]).unwrap())
        .unwrap();

    assert_eq!(fs::read_to_string(dest.join("unrelated.txt")).unwrap(), "keep me");
}

#[test]
fn staging_with_unmatched_or_empty_patterns_succeeds() {
    let ws = Workspace::ecms();
    let engine = StagingEngine::new(Arc::new(LocalFilesystem::new()));

    let none = engine
        .stage(&ws.host, &ws.cache.join("a"), &PatternSet::parse(["*.rs"]).unwrap())
        .unwrap();
    assert!(none.is_empty());

    let empty = engine
        .stage(&ws.host, &ws.cache.join("b"), &PatternSet::empty())
        .unwrap();
    assert!(empty.is_empty());
    assert!(ws.cache.join("b").is_dir());
}

#[test]
fn staging_from_missing_source_is_io_error() {
    let ws = Workspace::ecms();
    let engine = StagingEngine::new(Arc::new(LocalFilesystem::new()));

    let err = engine
        .stage(
            &ws.host.join("missing"),
            &ws.cache.join("dest"),
            &PatternSet::parse(["*"]).unwrap(),
        )
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Io);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn create_publishes_header_only_descriptor() {
    let ws = Workspace::ecms();
    let controller = ws.controller();
    let mut instance = controller.instance(ecms(true));

    let descriptor = instance.create(&ws.host).unwrap();

    assert_eq!(descriptor.recipe.to_string(), "ecms/1.0");
    assert_eq!(descriptor.includedirs, [rel("src")]);
    assert!(descriptor.libdirs.is_empty());
    assert!(descriptor.bindirs.is_empty());
    assert!(descriptor.is_header_only());

    for dir in &descriptor.includedirs {
        assert!(ws.package_root().join(dir.as_path()).is_dir());
    }

    let json = serde_json::to_value(&descriptor).unwrap();
    assert_eq!(json["includedirs"], serde_json::json!(["src"]));
    assert_eq!(json["libdirs"], serde_json::json!([]));
}

#[test]
fn no_copy_source_export_reuses_host_tree() {
    let ws = Workspace::ecms();
    let controller = ws.controller();
    let mut instance = controller.instance(ecms(true));

    let source = instance.export(&ws.host).unwrap();

    assert!(source.is_reused());
    assert_eq!(source.path(), ws.host.as_path());
    assert!(source.files().is_empty());
    assert!(!ws.cache.join("ecms/1.0/export").exists());
}

#[test]
fn copied_export_snapshots_exported_sources_only() {
    let ws = Workspace::ecms();
    let controller = ws.controller();
    let mut instance = controller.instance(ecms(false));

    let source = instance.export(&ws.host).unwrap();

    assert!(!source.is_reused());
    assert_eq!(source.path(), ws.cache.join("ecms/1.0/export"));
    assert_eq!(
        files_under(source.path()),
        ["src/EC/foo.hpp", "src/EC/readme.txt", "src/EC/sub/bar.hpp"]
    );
    assert!(!ws.cache.join("ecms/1.0/export.partial").exists());
}

#[test]
fn package_stages_matching_files_from_source_root() {
    let ws = Workspace::ecms();
    let controller = ws.controller();

    for no_copy_source in [true, false] {
        let mut instance = controller.instance(ecms(no_copy_source));
        instance.export(&ws.host).unwrap();
        let package = instance.package().unwrap();

        assert_eq!(package.path(), ws.package_root());
        assert_eq!(
            files_under(package.path()),
            [".pallet-manifest", "src/EC/foo.hpp", "src/EC/sub/bar.hpp"],
            "no_copy_source = {no_copy_source}"
        );
        assert_eq!(package.manifest().len(), 2);
    }
}

#[test]
fn package_root_is_sealed() {
    let ws = Workspace::ecms();
    let controller = ws.controller();
    let mut instance = controller.instance(ecms(true));
    instance.export(&ws.host).unwrap();
    instance.package().unwrap();

    for file in walkdir(&ws.package_root()) {
        assert!(
            fs::metadata(&file).unwrap().permissions().readonly(),
            "{} is writable",
            file.display()
        );
    }

    let report = controller.verify_cached(&RecipeRef::parse("ecms/1.0").unwrap()).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.checked, 2);
    assert_eq!(report.passed, 2);
}

#[test]
fn verify_detects_tampering() {
    let ws = Workspace::ecms();
    let controller = ws.controller();
    controller.instance(ecms(true)).create(&ws.host).unwrap();

    let header = ws.package_root().join("src/EC/foo.hpp");
    make_writable(&header);
    fs::write(&header, "tampered").unwrap();

    let report = controller.verify_cached(&RecipeRef::parse("ecms/1.0").unwrap()).unwrap();
    assert!(!report.is_clean());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, rel("src/EC/foo.hpp"));
    assert!(matches!(report.failures[0].issue, IntegrityIssue::Modified { .. }));
}

#[test]
fn package_before_export_fails_with_state_error() {
    let ws = Workspace::ecms();
    let controller = ws.controller();
    let mut instance = controller.instance(ecms(true));

    let err = instance.package().unwrap_err();
    assert_eq!(err.category(), ErrorCategory::State);
    assert!(!ws.package_root().exists());

    instance.export(&ws.host).unwrap();
    assert!(instance.package().is_ok());
}

#[test]
fn removing_includedir_after_packaging_is_configuration_error() {
    let ws = Workspace::ecms();
    let controller = ws.controller();
    let mut instance = controller.instance(ecms(true));
    instance.create(&ws.host).unwrap();

    fs::remove_dir_all(ws.package_root().join("src")).unwrap();

    let err = instance.describe().unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert!(matches!(
        err,
        PalletError::Application(ApplicationError::MissingDirectory { .. })
    ));
}

#[test]
fn reexport_invalidates_package_root() {
    let ws = Workspace::ecms();
    let controller = ws.controller();
    let mut instance = controller.instance(ecms(false));
    instance.create(&ws.host).unwrap();
    assert!(ws.package_root().is_dir());

    instance.export(&ws.host).unwrap();

    assert_eq!(instance.state().name(), "exported");
    assert!(!ws.package_root().exists());
    assert_eq!(instance.describe().unwrap_err().category(), ErrorCategory::State);
}

#[test]
fn inferred_includedirs_follow_packaged_layout() {
    let ws = Workspace::ecms();
    let controller = ws.controller();
    let recipe = Recipe::builder()
        .name("ecms")
        .version("1.0")
        .exports_sources(["src/EC/*"])
        .build()
        .unwrap();

    let descriptor = controller.instance(recipe).create(&ws.host).unwrap();
    assert_eq!(descriptor.includedirs, [rel("src")]);
}

#[test]
fn flat_headers_infer_package_root_as_includedir() {
    let ws = Workspace::ecms();
    write(&ws.host, "flat.hpp", "#pragma once\n");
    let controller = ws.controller();
    let recipe = Recipe::builder()
        .name("ecms")
        .version("1.0")
        .exports_sources(["flat.hpp"])
        .build()
        .unwrap();

    let descriptor = controller.instance(recipe).create(&ws.host).unwrap();
    assert_eq!(descriptor.includedirs, [RelativePath::root()]);
    assert!(ws.package_root().join("flat.hpp").is_file());
}

#[test]
fn export_in_fresh_run_invalidates_earlier_package() {
    let ws = Workspace::ecms();
    ws.controller().instance(ecms(true)).create(&ws.host).unwrap();
    assert!(ws.package_root().is_dir());

    write(&ws.host, "src/EC/new.hpp", "#pragma once\n");
    let controller = ws.controller();
    controller.instance(ecms(true)).export(&ws.host).unwrap();

    assert!(!ws.package_root().exists());
    let err = controller.describe_cached(&ecms(true)).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
}

#[test]
fn describe_cached_reads_an_earlier_package() {
    let ws = Workspace::ecms();
    let controller = ws.controller();
    controller.instance(ecms(true)).create(&ws.host).unwrap();

    let fresh = ws.controller();
    let descriptor = fresh.describe_cached(&ecms(true)).unwrap();
    assert_eq!(descriptor.includedirs, [rel("src")]);

    let other = Recipe::builder().name("ecms").version("2.0").build().unwrap();
    let err = fresh.describe_cached(&other).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
}

#[test]
fn sealed_package_can_be_described_concurrently() {
    let ws = Workspace::ecms();
    let controller = ws.controller();
    let mut instance = controller.instance(ecms(true));
    instance.create(&ws.host).unwrap();
    let instance = &instance;

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(move || instance.describe().unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().includedirs, [rel("src")]);
        }
    });
}

// ============================================================================
// Failure atomicity (in-memory filesystem)
// ============================================================================

fn memory_controller(fs: &MemoryFilesystem) -> LifecycleController {
    LifecycleController::new(Arc::new(fs.clone()), Arc::new(DirectoryCache::new("/cache")))
}

fn memory_host(fs: &MemoryFilesystem) {
    fs.add_file("/work/ecms/src/EC/foo.hpp", "foo");
    fs.add_file("/work/ecms/src/EC/sub/bar.hpp", "bar");
}

#[test]
fn failed_package_keeps_exported_state_and_no_partial_root() {
    let fs = MemoryFilesystem::new();
    memory_host(&fs);
    fs.inject_read_failure("/work/ecms/src/EC/sub/bar.hpp");

    let controller = memory_controller(&fs);
    let mut instance = controller.instance(ecms(true));
    instance.export(Path::new("/work/ecms")).unwrap();

    let err = instance.package().unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Io);
    assert_eq!(instance.state().name(), "exported");
    assert!(!fs.exists(Path::new("/cache/ecms/1.0/package")));
    assert!(!fs.exists(Path::new("/cache/ecms/1.0/package.partial")));
}

#[test]
fn failed_repackage_keeps_previous_package() {
    let fs = MemoryFilesystem::new();
    memory_host(&fs);

    let controller = memory_controller(&fs);
    let mut instance = controller.instance(ecms(true));
    let first = instance.create(Path::new("/work/ecms")).unwrap();

    fs.inject_rename_failure();
    assert!(instance.package().is_err());

    assert_eq!(instance.state().name(), "packaged");
    assert!(fs.is_readonly("/cache/ecms/1.0/package/src/EC/foo.hpp"));
    assert!(!fs.exists(Path::new("/cache/ecms/1.0/package.partial")));
    assert_eq!(instance.describe().unwrap(), first);
}

#[test]
fn failed_export_keeps_uninitialized_state() {
    let fs = MemoryFilesystem::new();
    memory_host(&fs);
    fs.inject_read_failure("/work/ecms/src/EC/foo.hpp");

    let controller = memory_controller(&fs);
    let mut instance = controller.instance(ecms(false));

    assert!(instance.export(Path::new("/work/ecms")).is_err());
    assert_eq!(instance.state(), &RecipeState::Uninitialized);
    assert!(!fs.exists(Path::new("/cache/ecms/1.0/export")));
    assert!(!fs.exists(Path::new("/cache/ecms/1.0/export.partial")));
}

#[test]
fn host_default_patterns_apply_when_recipe_declares_none() {
    let fs = MemoryFilesystem::new();
    memory_host(&fs);
    fs.add_file("/work/ecms/src/EC/legacy.h", "legacy");

    let controller = memory_controller(&fs).with_defaults(HostDefaults {
        package_patterns: PatternSet::parse(["*.h"]).unwrap(),
    });
    let mut instance = controller.instance(ecms(true));
    instance.export(Path::new("/work/ecms")).unwrap();
    let package = instance.package().unwrap();

    let staged: Vec<_> = package.files().paths().map(ToString::to_string).collect();
    assert_eq!(staged, ["src/EC/legacy.h"]);
}
