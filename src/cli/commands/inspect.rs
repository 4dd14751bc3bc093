//! Inspect command - show the header of a patch container

use crate::cache::format_bytes;
use crate::cli::args::InspectArgs;
use crate::container::PatchContainer;
use crate::error::{FlangeError, FlangeResult};
use crate::ui::{self, UiContext};
use sha2::{Digest, Sha256};
use tokio::fs;

/// Execute the inspect command
pub async fn execute(args: InspectArgs) -> FlangeResult<()> {
    let ctx = UiContext::detect();
    let path = &args.container;

    let bytes = fs::read(path)
        .await
        .map_err(|e| FlangeError::io(format!("reading {}", path.display()), e))?;

    let container = PatchContainer::decode(&bytes).map_err(|source| FlangeError::MalformedPatch {
        name: path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        path: path.clone(),
        source,
    })?;

    ui::key_value(&ctx, "Container", &path.display().to_string());
    ui::key_value(&ctx, "Base version", &container.base_version);
    ui::key_value(
        &ctx,
        "Patch size",
        &format!(
            "{} ({} bytes)",
            format_bytes(container.patch.len() as u64),
            container.patch.len()
        ),
    );
    ui::key_value(
        &ctx,
        "Patch sha256",
        &hex::encode(Sha256::digest(&container.patch)),
    );
    Ok(())
}
