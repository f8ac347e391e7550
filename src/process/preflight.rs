/*!
 * Startup Preflight
 * Checks the control-plane CLI before an interactive session and warms the
 * image cache so the first launch of each kind does not wait on a pull
 */

use crate::core::config::LaunchConfig;
use crate::core::errors::DprocResult;
use crate::core::limits::PREPULL_POD_PREFIX;
use crate::gateway::{ControlPlane, Gateway};
use tracing::{debug, info};

/// Verify the CLI runs, then pre-pull every launch image unless `prepull` is off.
/// Returns the number of images pulled. Stops at the first failing step.
pub fn run_preflight(gateway: &dyn Gateway, launch: &LaunchConfig, prepull: bool) -> DprocResult<usize> {
    let version = gateway.client_version()?;
    debug!(version = %version.trim(), "Control-plane client found");

    if !prepull {
        info!("Image pre-pull disabled");
        return Ok(0);
    }

    let images = launch.images();
    for (i, image) in images.iter().enumerate() {
        let name = format!("{}-{}", PREPULL_POD_PREFIX, i);
        gateway.prepull_image(&name, image)?;
        debug!(image = %image, "Image pre-pulled");
    }
    info!(count = images.len(), "Launch images pre-pulled");
    Ok(images.len())
}
