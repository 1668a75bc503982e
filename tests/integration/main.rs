//! Integration tests for ewa-cache

mod lifecycle_tests {
    use async_trait::async_trait;
    use ewa_cache::cache::{
        CacheManager, Invalidation, SealOutcome, Sha256TreeHasher, TreeHasher, Verdict,
        CACHE_SUBDIRS, STAMP_FILE,
    };
    use ewa_cache::fs::{FileSystem, TokioFs};
    use ewa_cache::session::{BuildSession, CacheContext};
    use std::io;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn context(temp: &TempDir) -> CacheContext {
        CacheContext::new(temp.path().join("cache"), true, "cfg-1", "1.0.0")
    }

    fn add_item(ctx: &CacheContext, name: &str) {
        std::fs::write(ctx.items_dir().join(name), name).unwrap();
    }

    fn items(ctx: &CacheContext) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(ctx.items_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn root_listing(ctx: &CacheContext) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(ctx.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn session(identities: &[&str]) -> BuildSession {
        let mut session = BuildSession::new();
        session.extend(identities.iter().copied());
        session
    }

    /// A cache that went through one full session with items `a` and `b`
    async fn sealed_cache(ctx: &CacheContext) {
        let manager = CacheManager::new(ctx.clone());
        manager.ensure().await.unwrap();
        add_item(ctx, "a.min.js");
        add_item(ctx, "b.min.css");
        manager.seal(&session(&["a", "b"])).await.unwrap();
    }

    fn assert_fresh_layout(ctx: &CacheContext) {
        let mut expected: Vec<String> = CACHE_SUBDIRS.iter().map(|s| s.to_string()).collect();
        expected.sort();
        assert_eq!(root_listing(ctx), expected);
        for name in CACHE_SUBDIRS {
            assert_eq!(std::fs::read_dir(ctx.subdir(name)).unwrap().count(), 0);
        }
    }

    #[tokio::test]
    async fn idempotent_seal() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        sealed_cache(&ctx).await;
        let manager = CacheManager::new(ctx.clone());

        let first = manager.seal(&session(&["a", "b"])).await.unwrap();
        let second = manager.seal(&session(&["a", "b"])).await.unwrap();

        let (SealOutcome::Stamped { stamp: s1, .. }, SealOutcome::Stamped { stamp: s2, .. }) =
            (first, second)
        else {
            panic!("expected stamped outcomes");
        };
        assert_eq!(s1.hash, s2.hash);

        let verdict = manager.ensure().await.unwrap();
        assert_eq!(verdict, Verdict::Reused);
        assert_eq!(items(&ctx), vec!["a.min.js", "b.min.css"]);
    }

    #[tokio::test]
    async fn config_change_invalidates() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        sealed_cache(&ctx).await;

        let changed = CacheManager::new(ctx.clone().with_config_hash("cfg-2"));
        let verdict = changed.ensure().await.unwrap();

        assert_eq!(verdict.reasons(), &[Invalidation::ConfigMismatch]);
        assert_fresh_layout(&ctx);
    }

    #[tokio::test]
    async fn version_change_invalidates() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        sealed_cache(&ctx).await;

        let upgraded = CacheManager::new(ctx.clone().with_version("1.1.0"));
        let verdict = upgraded.ensure().await.unwrap();

        assert!(matches!(
            verdict.reasons(),
            [Invalidation::VersionMismatch { .. }]
        ));
        assert_fresh_layout(&ctx);
    }

    #[tokio::test]
    async fn disabled_cache_invalidates() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        sealed_cache(&ctx).await;

        let mut disabled = ctx.clone();
        disabled.use_cache = false;
        let verdict = CacheManager::new(disabled).ensure().await.unwrap();

        assert!(!verdict.is_valid());
        assert_fresh_layout(&ctx);
    }

    #[tokio::test]
    async fn corrupt_stamp_invalidates() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        sealed_cache(&ctx).await;
        std::fs::write(ctx.stamp_path(), "{ truncated").unwrap();

        let verdict = CacheManager::new(ctx.clone()).ensure().await.unwrap();

        assert_eq!(verdict.reasons(), &[Invalidation::MissingStamp]);
        assert_fresh_layout(&ctx);
    }

    #[tokio::test]
    async fn pruning_keeps_only_live_identities() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        let manager = CacheManager::new(ctx.clone());
        manager.ensure().await.unwrap();
        add_item(&ctx, "a.min.js");
        add_item(&ctx, "b.min.js");
        add_item(&ctx, "c.min.js");

        manager.seal(&session(&["a", "c"])).await.unwrap();

        assert_eq!(items(&ctx), vec!["a.min.js", "c.min.js"]);
        assert!(manager.ensure().await.unwrap().is_valid());
    }

    /// Real filesystem that refuses to delete one artifact
    struct StubbornFs {
        protected: &'static str,
    }

    #[async_trait]
    impl FileSystem for StubbornFs {
        async fn ensure_dir(&self, path: &Path) -> io::Result<()> {
            TokioFs.ensure_dir(path).await
        }
        async fn ensure_file(&self, path: &Path) -> io::Result<()> {
            TokioFs.ensure_file(path).await
        }
        async fn empty_dir(&self, path: &Path) -> io::Result<()> {
            TokioFs.empty_dir(path).await
        }
        async fn remove(&self, path: &Path) -> io::Result<()> {
            if path.file_name().is_some_and(|name| name == self.protected) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
            }
            TokioFs.remove(path).await
        }
        async fn read_to_string(&self, path: &Path) -> io::Result<String> {
            TokioFs.read_to_string(path).await
        }
        async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
            TokioFs.write(path, contents).await
        }
        async fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
            TokioFs.list_files(dir).await
        }
    }

    #[tokio::test]
    async fn failed_removal_does_not_fail_seal() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        let manager = CacheManager::with_backends(
            ctx.clone(),
            Box::new(StubbornFs {
                protected: "b.min.js",
            }),
            Box::new(Sha256TreeHasher),
        );
        manager.ensure().await.unwrap();
        for name in ["a.min.js", "b.min.js", "c.min.js", "d.min.js"] {
            add_item(&ctx, name);
        }

        let outcome = manager.seal(&session(&["a"])).await.unwrap();

        let SealOutcome::Stamped { prune, .. } = outcome else {
            panic!("expected a stamped cache");
        };
        assert_eq!(prune.removed.len(), 2);
        assert_eq!(prune.failed.len(), 1);
        assert_eq!(items(&ctx), vec!["a.min.js", "b.min.js"]);
    }

    #[tokio::test]
    async fn disabled_seal_removes_cache() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        sealed_cache(&ctx).await;

        let mut disabled = ctx.clone();
        disabled.use_cache = false;
        let outcome = CacheManager::new(disabled)
            .seal(&session(&["a"]))
            .await
            .unwrap();

        assert_eq!(outcome, SealOutcome::Removed { clean: true });
        assert!(!ctx.root().exists());
    }

    #[tokio::test]
    async fn stamp_is_excluded_from_tree_hash() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        for root in [a.path(), b.path()] {
            std::fs::create_dir_all(root.join("items")).unwrap();
            std::fs::write(root.join("items/a.min.js"), "same").unwrap();
        }
        std::fs::write(a.path().join(STAMP_FILE), r#"{"hash":"x"}"#).unwrap();
        std::fs::write(b.path().join(STAMP_FILE), "something else").unwrap();

        let exclude = [PathBuf::from(STAMP_FILE)];
        let hash_a = Sha256TreeHasher.hash(a.path(), &exclude).await.unwrap();
        let hash_b = Sha256TreeHasher.hash(b.path(), &exclude).await.unwrap();

        assert_eq!(hash_a, hash_b);
    }

    #[tokio::test]
    async fn leftover_file_forces_rebuild_next_session() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        sealed_cache(&ctx).await;
        std::fs::write(ctx.subdir("icons").join("stray.png"), "x").unwrap();

        let verdict = CacheManager::new(ctx.clone()).ensure().await.unwrap();

        assert!(matches!(
            verdict.reasons(),
            [Invalidation::HashMismatch { .. }]
        ));
        assert_fresh_layout(&ctx);
    }
}

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn ewa() -> Command {
        let mut cmd = cargo_bin_cmd!("ewa-cache");
        cmd.env_remove("EWA_CONFIG").env_remove("EWA_CONFIG_HASH");
        cmd
    }

    /// Project with an `ewa.toml` keeping its cache in `<project>/cache`
    fn project() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("ewa.toml");
        std::fs::write(&config, "[cache]\npath = \"cache\"\n").unwrap();
        (temp, config)
    }

    fn run(config: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
        ewa().arg("-c").arg(config).args(args).assert()
    }

    #[test]
    fn help_displays() {
        ewa()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Persistent build cache"));
    }

    #[test]
    fn version_displays() {
        ewa()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("ewa-cache"));
    }

    #[test]
    fn full_session_cycle() {
        let (temp, config) = project();
        let items = temp.path().join("cache").join("items");

        run(&config, &["ensure"])
            .success()
            .stdout(predicate::str::contains("Rebuilt cache"));
        assert!(items.is_dir());

        std::fs::write(items.join("abc.min.js"), "x").unwrap();
        std::fs::write(items.join("old.min.js"), "y").unwrap();

        run(&config, &["seal", "--live", "abc"])
            .success()
            .stdout(predicate::str::contains("1 kept, 1 removed"));
        assert!(!items.join("old.min.js").exists());

        run(&config, &["status"])
            .success()
            .stdout(predicate::str::contains("valid, will be reused"));

        run(&config, &["ensure"])
            .success()
            .stdout(predicate::str::contains("is valid"));
        assert!(items.join("abc.min.js").exists());
    }

    #[test]
    fn config_hash_override_marks_stale() {
        let (_temp, config) = project();
        run(&config, &["ensure"]).success();
        run(&config, &["seal"]).success();

        run(&config, &["--config-hash", "something-else", "status"])
            .success()
            .stdout(predicate::str::contains("build configuration changed"));
    }

    #[test]
    fn status_json() {
        let (_temp, config) = project();

        run(&config, &["status", "--format", "json"])
            .success()
            .stdout(predicate::str::contains("\"valid\": false"));
    }

    #[test]
    fn seal_with_live_file() {
        let (temp, config) = project();
        run(&config, &["ensure"]).success();
        let items = temp.path().join("cache").join("items");
        std::fs::write(items.join("keep.webp"), "").unwrap();
        std::fs::write(items.join("drop.webp"), "").unwrap();
        let live = temp.path().join("live.txt");
        std::fs::write(&live, "# produced this run\nkeep\n").unwrap();

        run(&config, &["seal", "--live-file", live.to_str().unwrap()]).success();

        assert!(items.join("keep.webp").exists());
        assert!(!items.join("drop.webp").exists());
    }

    #[test]
    fn seal_missing_live_file_fails() {
        let (temp, config) = project();
        run(&config, &["ensure"]).success();

        let missing = temp.path().join("missing.txt");
        run(&config, &["seal", "--live-file", missing.to_str().unwrap()])
            .failure()
            .stderr(predicate::str::contains("Error:"));
    }

    #[test]
    fn no_cache_seal_removes_cache() {
        let (temp, config) = project();
        run(&config, &["ensure"]).success();
        assert!(temp.path().join("cache").exists());

        run(&config, &["--no-cache", "seal"])
            .success()
            .stdout(predicate::str::contains("cache removed"));
        assert!(!temp.path().join("cache").exists());
    }

    #[test]
    fn clear_removes_cache() {
        let (temp, config) = project();
        run(&config, &["ensure"]).success();

        run(&config, &["clear"]).success();
        assert!(!temp.path().join("cache").exists());
    }

    #[test]
    fn discovered_config_matches_explicit_config() {
        let (temp, config) = project();
        run(&config, &["ensure"]).success();
        run(&config, &["seal"]).success();

        ewa()
            .current_dir(temp.path())
            .args(["-c", "ewa.toml", "status"])
            .assert()
            .success()
            .stdout(predicate::str::contains("valid, will be reused"));

        let nested = temp.path().join("source");
        std::fs::create_dir_all(&nested).unwrap();
        ewa()
            .current_dir(&nested)
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("valid, will be reused"));
    }

    #[test]
    fn debug_logging_covers_config_loading() {
        let (_temp, config) = project();

        run(&config, &["-vv", "status"])
            .success()
            .stderr(predicate::str::contains("Loaded config from"));
    }

    #[test]
    fn missing_explicit_config_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("ewa.toml");

        run(&missing, &["status"])
            .failure()
            .stderr(predicate::str::contains("Configuration file not found"))
            .stderr(predicate::str::contains("config init"));
    }

    #[test]
    fn config_init_creates_explicit_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ewa.toml");

        run(&path, &["config", "init"]).success();
        assert!(path.is_file());
    }

    #[test]
    fn config_path() {
        let (_temp, config) = project();

        run(&config, &["config", "path"])
            .success()
            .stdout(predicate::str::contains("ewa.toml"));
    }

    #[test]
    fn config_show() {
        let (_temp, config) = project();

        run(&config, &["config", "show"])
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("fingerprint"));
    }

    #[test]
    fn invalid_config_fails() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("ewa.toml");
        std::fs::write(&config, "[cache\n").unwrap();

        run(&config, &["status"])
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}
