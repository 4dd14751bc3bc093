//! Resolve command - build a patched version from its patch container

use super::resolve_blocking;
use crate::artifact::CacheableArtifact;
use crate::cli::args::ResolveArgs;
use crate::config::Config;
use crate::error::{FlangeError, FlangeResult};
use crate::remote::RemoteLocator;
use crate::ui::{self, TaskSpinner, UiContext};
use crate::version::{patch_locator, VersionCache};
use std::path::Path;
use tracing::debug;
use url::Url;

/// Execute the resolve command
pub async fn execute(args: ResolveArgs, config: &Config, cache_root: &Path) -> FlangeResult<()> {
    let ctx = UiContext::detect();
    let cache = VersionCache::from_config(config, cache_root);

    let diff_url = match args.diff_url {
        Some(raw) => Url::parse(&raw).map_err(|e| FlangeError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?,
        None => patch_locator(config)?
            .locate(&args.version)?
            .map(|location| location.url)
            .ok_or_else(|| FlangeError::VersionNotFound(args.version.clone()))?,
    };
    debug!("Patch container for {} at {}", args.version, diff_url);

    let diff = cache.patch_artifact(&args.version, diff_url)?;
    let patched = cache.patched_artifact(&args.version, diff)?;

    if patched.is_cached() {
        ui::step_ok(&ctx, &format!("{} already built", args.version));
        println!("{}", patched.target_path().display());
        return Ok(());
    }

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Resolving {}...", args.version));

    match resolve_blocking(patched).await {
        Ok(path) => {
            spinner.stop(&format!("Built {}", args.version));
            println!("{}", path.display());
            Ok(())
        }
        Err(e) => {
            spinner.stop_error(&format!("Failed to resolve {}", args.version));
            Err(e)
        }
    }
}
