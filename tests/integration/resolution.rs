//! End-to-end resolution against a local HTTP server

use assert_cmd::cargo::cargo_bin_cmd;
use flange::artifact::CacheableArtifact;
use flange::container::PatchContainer;
use flange::error::{FetchFailure, FlangeError};
use flange::remote::{StaticLocator, UreqClient};
use flange::VersionCache;
use predicates::prelude::*;
use std::fs;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE: &[u8] = b"vanilla server build 1.8, repeated content repeated content";
const MODDED: &[u8] = b"vanilla server build 1.8, patched content repeated content!";

fn bsdiff(source: &[u8], target: &[u8]) -> Vec<u8> {
    let mut patch = Vec::new();
    qbsdiff::Bsdiff::new(source, target)
        .compare(Cursor::new(&mut patch))
        .unwrap();
    patch
}

fn container() -> Vec<u8> {
    PatchContainer::new("1.8", bsdiff(BASE, MODDED))
        .encode()
        .unwrap()
}

async fn serve(server: &MockServer, route: &str, body: Vec<u8>, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .expect(expected_hits)
        .mount(server)
        .await;
}

fn cache_for(dir: &TempDir, server: &MockServer) -> VersionCache {
    let mut bases = StaticLocator::new();
    bases.insert(
        "1.8",
        Url::parse(&format!("{}/vanilla/1.8.jar", server.uri())).unwrap(),
    );
    VersionCache::builder(dir.path())
        .locator(bases)
        .client(Arc::new(UreqClient::new(Duration::from_secs(10))))
        .build()
}

fn diff_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/patch/mod-1.fldiff", server.uri())).unwrap()
}

#[tokio::test]
async fn resolves_patched_build() {
    let server = MockServer::start().await;
    serve(&server, "/vanilla/1.8.jar", BASE.to_vec(), 1).await;
    serve(&server, "/patch/mod-1.fldiff", container(), 1).await;

    let dir = TempDir::new().unwrap();
    let cache = cache_for(&dir, &server);
    let diff = cache.patch_artifact("mod-1", diff_url(&server)).unwrap();
    let patched = cache.patched_artifact("mod-1", diff).unwrap();

    let path = tokio::task::spawn_blocking(move || patched.resolve())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(path, dir.path().join("modded/mod-1.jar"));
    assert_eq!(fs::read(&path).unwrap(), MODDED);
    assert_eq!(fs::read(dir.path().join("vanilla/1.8.jar")).unwrap(), BASE);
    assert!(dir.path().join("modded/mod-1.jar.sha256").exists());
}

#[tokio::test]
async fn second_resolution_stays_local() {
    let server = MockServer::start().await;
    serve(&server, "/vanilla/1.8.jar", BASE.to_vec(), 1).await;
    serve(&server, "/patch/mod-1.fldiff", container(), 1).await;

    let dir = TempDir::new().unwrap();
    for _ in 0..2 {
        let cache = cache_for(&dir, &server);
        let diff = cache.patch_artifact("mod-1", diff_url(&server)).unwrap();
        let patched = cache.patched_artifact("mod-1", diff).unwrap();
        tokio::task::spawn_blocking(move || patched.populate())
            .await
            .unwrap()
            .unwrap();
    }
    // Mock expectations are verified when the server drops
}

#[tokio::test]
async fn missing_base_leaves_no_patched_build() {
    let server = MockServer::start().await;
    serve(&server, "/patch/mod-1.fldiff", container(), 1).await;

    let dir = TempDir::new().unwrap();
    let cache = cache_for(&dir, &server);
    let diff = cache.patch_artifact("mod-1", diff_url(&server)).unwrap();
    let patched = cache.patched_artifact("mod-1", diff).unwrap();

    let handle = patched.clone();
    let err = tokio::task::spawn_blocking(move || handle.populate())
        .await
        .unwrap()
        .unwrap_err();

    assert!(matches!(
        err.root_cause(),
        FlangeError::RemoteFetch {
            failure: FetchFailure::Status {
                expected: 200,
                actual: 404
            },
            ..
        }
    ));
    assert!(!patched.is_cached());
    assert!(!dir.path().join("vanilla/1.8.jar").exists());
}

#[tokio::test]
async fn cli_resolve_with_diff_url() {
    let server = MockServer::start().await;
    serve(&server, "/vanilla/1.8.jar", BASE.to_vec(), 1).await;
    serve(&server, "/patch/mod-1.fldiff", container(), 1).await;

    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        format!(
            "[remote]\nvanilla_url = \"{}/vanilla/{{version}}.jar\"\n",
            server.uri()
        ),
    )
    .unwrap();

    let config = dir.path().join("config.toml");
    let cache = dir.path().join("cache");
    let url = diff_url(&server).to_string();

    let assert = tokio::task::spawn_blocking(move || {
        cargo_bin_cmd!("flange")
            .env("FLANGE_CONFIG", config)
            .env("FLANGE_CACHE_DIR", cache)
            .env("CI", "1")
            .args(["resolve", "mod-1", "--diff-url", url.as_str()])
            .assert()
    })
    .await
    .unwrap();

    assert
        .success()
        .stdout(predicate::str::contains("mod-1.jar"));
    assert_eq!(
        fs::read(dir.path().join("cache/modded/mod-1.jar")).unwrap(),
        MODDED
    );
}
