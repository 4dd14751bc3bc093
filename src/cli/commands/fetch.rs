//! Fetch command - download a vanilla build into the cache

use super::resolve_blocking;
use crate::artifact::CacheableArtifact;
use crate::cli::args::FetchArgs;
use crate::config::Config;
use crate::error::FlangeResult;
use crate::ui::{self, TaskSpinner, UiContext};
use crate::version::VersionCache;
use std::path::Path;

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config, cache_root: &Path) -> FlangeResult<()> {
    let ctx = UiContext::detect();
    let cache = VersionCache::from_config(config, cache_root);
    let artifact = cache.base_artifact(&args.version)?;

    if artifact.is_cached() {
        ui::step_ok(&ctx, &format!("{} already cached", args.version));
        println!("{}", artifact.target_path().display());
        return Ok(());
    }

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Downloading {}...", args.version));

    match resolve_blocking(artifact).await {
        Ok(path) => {
            spinner.stop(&format!("Fetched {}", args.version));
            println!("{}", path.display());
            Ok(())
        }
        Err(e) => {
            spinner.stop_error(&format!("Failed to fetch {}", args.version));
            Err(e)
        }
    }
}
