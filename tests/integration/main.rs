//! Integration tests for Flange

mod resolution;

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use flange::container::PatchContainer;
    use predicates::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    /// Binary isolated from the user's config and cache
    fn flange(dir: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("flange");
        cmd.env("FLANGE_CONFIG", dir.path().join("config.toml"))
            .env("FLANGE_CACHE_DIR", dir.path().join("cache"))
            .env("CI", "1");
        cmd
    }

    #[test]
    fn help_displays() {
        let dir = TempDir::new().unwrap();
        flange(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("vanilla and patched server builds"));
    }

    #[test]
    fn version_displays() {
        let dir = TempDir::new().unwrap();
        flange(&dir)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("flange"));
    }

    #[test]
    fn config_path_honors_env() {
        let dir = TempDir::new().unwrap();
        flange(&dir)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let dir = TempDir::new().unwrap();
        flange(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[remote]"))
            .stdout(predicate::str::contains("Minecraft.Download"));
    }

    #[test]
    fn config_init_writes_file() {
        let dir = TempDir::new().unwrap();
        flange(&dir).args(["config", "init"]).assert().success();
        assert!(dir.path().join("config.toml").exists());

        flange(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--force"));
    }

    #[test]
    fn invalid_config_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "[remote\n").unwrap();

        flange(&dir)
            .args(["cache", "path"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:"));
    }

    #[test]
    fn cache_path_uses_cache_dir() {
        let dir = TempDir::new().unwrap();
        flange(&dir)
            .args(["cache", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cache"));
    }

    #[test]
    fn cache_list_empty() {
        let dir = TempDir::new().unwrap();
        flange(&dir)
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached artifacts"));
    }

    #[test]
    fn cache_list_json() {
        let dir = TempDir::new().unwrap();
        let vanilla = dir.path().join("cache").join("vanilla");
        fs::create_dir_all(&vanilla).unwrap();
        fs::write(vanilla.join("1.8.jar"), b"HELLO").unwrap();

        let output = flange(&dir)
            .args(["cache", "list", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(entries[0]["category"], "vanilla");
        assert_eq!(entries[0]["name"], "1.8");
        assert_eq!(entries[0]["size_bytes"], 5);
    }

    #[test]
    fn cache_clear_requires_confirmation() {
        let dir = TempDir::new().unwrap();
        let vanilla = dir.path().join("cache").join("vanilla");
        fs::create_dir_all(&vanilla).unwrap();
        fs::write(vanilla.join("1.8.jar"), b"HELLO").unwrap();

        flange(&dir)
            .args(["cache", "clear"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Aborted"));
        assert!(vanilla.join("1.8.jar").exists());

        flange(&dir)
            .args(["cache", "clear", "--yes"])
            .assert()
            .success();
        assert!(!vanilla.join("1.8.jar").exists());
    }

    #[test]
    fn cache_verify_fails_on_corruption() {
        let dir = TempDir::new().unwrap();
        let vanilla = dir.path().join("cache").join("vanilla");
        fs::create_dir_all(&vanilla).unwrap();
        fs::write(vanilla.join("1.8.jar"), b"HELLO").unwrap();
        fs::write(
            vanilla.join("1.8.jar.sha256"),
            "3733cd977ff8eb18b987357e22ced99f46097f31ecb239e878ae63760e83e4d5\n",
        )
        .unwrap();

        flange(&dir).args(["cache", "verify"]).assert().success();

        fs::write(vanilla.join("1.8.jar"), b"HELLO, tampered").unwrap();
        flange(&dir)
            .args(["cache", "verify"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("do not match their recorded digest"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn pack_then_inspect() {
        let dir = TempDir::new().unwrap();
        let raw = dir.path().join("raw.patch");
        let out = dir.path().join("mod-1.fldiff");
        fs::write(&raw, b"BSDIFF40 payload").unwrap();

        flange(&dir)
            .args(["pack", "--base", "1.8"])
            .arg(&raw)
            .arg("-o")
            .arg(&out)
            .assert()
            .success();

        let container = PatchContainer::decode(&fs::read(&out).unwrap()).unwrap();
        assert_eq!(container.base_version, "1.8");
        assert_eq!(container.patch, b"BSDIFF40 payload");

        flange(&dir)
            .arg("inspect")
            .arg(&out)
            .assert()
            .success()
            .stdout(predicate::str::contains("1.8"))
            .stdout(predicate::str::contains("16 bytes"));
    }

    #[test]
    fn inspect_rejects_non_container() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("server.jar");
        fs::write(&path, b"PK\x03\x04").unwrap();

        flange(&dir)
            .arg("inspect")
            .arg(&path)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn fetch_unreachable_host_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            "[remote]\nvanilla_url = \"http://127.0.0.1:9/{version}.jar\"\ntimeout_secs = 5\n",
        )
        .unwrap();

        flange(&dir)
            .args(["fetch", "1.8"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Could not retrieve 1.8"));
        assert!(!dir.path().join("cache/vanilla/1.8.jar").exists());
    }

    #[test]
    fn resolve_without_patch_source_fails() {
        let dir = TempDir::new().unwrap();
        flange(&dir)
            .args(["resolve", "mod-1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("mod-1"))
            .stderr(predicate::str::contains("Hint:"));
    }
}
