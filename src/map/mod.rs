mod geometry;
mod projection;
mod ramp;
mod renderer;
mod spatial;

pub use projection::Viewport;
pub use ramp::{legend, ramp_color};
pub use renderer::{DisplaySettings, Focus, MapLayers, MapRenderer};
pub use spatial::FeatureGrid;
