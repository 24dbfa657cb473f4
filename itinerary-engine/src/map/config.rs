//! Map projection configuration.

/// Default padding around fitted bounds, in pixels.
const DEFAULT_FIT_PADDING_PX: u32 = 50;

/// Configuration for the map projector.
#[derive(Debug, Clone)]
pub struct MapConfig {
    /// Padding the substrate should keep around fitted markers.
    pub fit_padding_px: u32,
}

impl MapConfig {
    /// Set the fit-bounds padding.
    pub fn with_fit_padding(mut self, px: u32) -> Self {
        self.fit_padding_px = px;
        self
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            fit_padding_px: DEFAULT_FIT_PADDING_PX,
        }
    }
}
