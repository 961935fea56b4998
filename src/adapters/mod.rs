pub mod android;
pub mod apple;

pub use android::AndroidAdapter;
pub use apple::AppleAdapter;

use std::path::Path;

use tracing::warn;

/// Write the raw provider payload next to the pipeline output for operator
/// debugging. This is a side channel: failures are logged, never propagated.
pub(crate) fn dump_artifact(output_dir: &Path, file_name: &str, payload: &serde_json::Value) {
    let write = || -> anyhow::Result<()> {
        std::fs::create_dir_all(output_dir)?;
        let content = serde_json::to_string_pretty(payload)?;
        std::fs::write(output_dir.join(file_name), content)?;
        Ok(())
    };

    if let Err(e) = write() {
        warn!(file = file_name, error = %e, "Failed to write raw payload artifact");
    }
}
