//! Still-image loading.

use super::RawFrame;
use crate::error::{Result, ResultExt};
use std::path::Path;

/// Decode an image file into a [`RawFrame`].
///
/// Any format enabled on the `image` dependency is accepted. The frame may have
/// arbitrary dimensions; it is not tied to the capture size.
pub fn load_still_image(path: impl AsRef<Path>) -> Result<RawFrame> {
    let path = path.as_ref();
    let img = image::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    tracing::debug!(
        "Loaded still image {} ({}x{}, {:?})",
        path.display(),
        img.width(),
        img.height(),
        img.color()
    );
    Ok(RawFrame::from_dynamic(img))
}
