//! Pack command - wrap a raw patch into a patch container

use crate::cli::args::PackArgs;
use crate::container::PatchContainer;
use crate::error::{FlangeError, FlangeResult};
use crate::ui::{self, UiContext};
use tokio::fs;

/// Execute the pack command
pub async fn execute(args: PackArgs) -> FlangeResult<()> {
    let ctx = UiContext::detect();

    let patch = fs::read(&args.patch)
        .await
        .map_err(|e| FlangeError::io(format!("reading patch {}", args.patch.display()), e))?;

    let container = PatchContainer::new(&args.base, patch);
    let bytes = container.encode().map_err(|source| FlangeError::MalformedPatch {
        name: args.base.clone(),
        path: args.output.clone(),
        source,
    })?;

    fs::write(&args.output, &bytes)
        .await
        .map_err(|e| FlangeError::io(format!("writing {}", args.output.display()), e))?;

    ui::step_ok_detail(
        &ctx,
        &format!("Packed patch for base {}", args.base),
        &format!("{} ({} bytes)", args.output.display(), bytes.len()),
    );
    Ok(())
}
