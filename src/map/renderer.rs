use glam::DVec2;
use ratatui::style::Color;

use crate::braille::BrailleCanvas;
use crate::data::BanTable;
use crate::map::geometry::{draw_line, fill_rings};
use crate::map::projection::Viewport;
use crate::map::ramp::ramp_color;
use crate::region::{Atlas, Estimates, Region};

/// Display settings for map layers
#[derive(Clone)]
pub struct DisplaySettings {
    pub show_fills: bool,
    pub show_borders: bool,
    pub show_counties: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_fills: true,
            show_borders: true,
            show_counties: true,
        }
    }
}

/// Selected state plus the counties drawn inside it
pub struct Focus<'a> {
    pub state: usize,
    pub counties: &'a [usize],
    pub estimates: &'a Estimates,
}

/// One frame's canvases, composed back to front by the UI
pub struct MapLayers {
    /// State fills, overdrawn by county fills of the focused state
    pub fills: BrailleCanvas,
    pub state_borders: BrailleCanvas,
    pub county_borders: BrailleCanvas,
    /// Outline of the focused state
    pub outline: BrailleCanvas,
}

impl MapLayers {
    fn new(width: usize, height: usize) -> Self {
        Self {
            fills: BrailleCanvas::new(width, height),
            state_borders: BrailleCanvas::new(width, height),
            county_borders: BrailleCanvas::new(width, height),
            outline: BrailleCanvas::new(width, height),
        }
    }
}

/// Choropleth renderer for states and the counties of a focused state
#[derive(Default)]
pub struct MapRenderer {
    pub settings: DisplaySettings,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render all layers for a `width` x `height` character area
    pub fn render(
        &self,
        atlas: &Atlas,
        bans: &BanTable,
        focus: Option<&Focus>,
        width: usize,
        height: usize,
        viewport: &Viewport,
    ) -> MapLayers {
        let mut layers = MapLayers::new(width, height);
        let visible = atlas.states_in(&viewport.visible_bounds());
        let states = atlas.states();

        if self.settings.show_fills {
            for &idx in &visible {
                let state = &states[idx];
                fill_region(&mut layers.fills, state, ramp_color(bans.get(&state.name)), viewport);
            }
        }

        if let Some(focus) = focus {
            if self.settings.show_counties {
                for county in focus.counties.iter().filter_map(|&c| atlas.counties().get(c)) {
                    if self.settings.show_fills {
                        let color = ramp_color(focus.estimates.get(&county.id));
                        fill_region(&mut layers.fills, county, color, viewport);
                    }
                    outline_region(&mut layers.county_borders, county, viewport);
                }
            }
            if let Some(state) = states.get(focus.state) {
                outline_region(&mut layers.outline, state, viewport);
            }
        }

        if self.settings.show_borders {
            for &idx in &visible {
                outline_region(&mut layers.state_borders, &states[idx], viewport);
            }
        }

        layers
    }

    /// Toggle choropleth fills
    pub fn toggle_fills(&mut self) {
        self.settings.show_fills = !self.settings.show_fills;
    }

    /// Toggle state borders
    pub fn toggle_borders(&mut self) {
        self.settings.show_borders = !self.settings.show_borders;
    }

    /// Toggle county drill-down layers
    pub fn toggle_counties(&mut self) {
        self.settings.show_counties = !self.settings.show_counties;
    }
}

/// Whether the region's bbox lands anywhere on the canvas
fn on_screen(region: &Region, viewport: &Viewport) -> bool {
    if region.bounds.is_empty() {
        return false;
    }
    let top_left = viewport.project(region.bounds.min.x, region.bounds.max.y);
    let bottom_right = viewport.project(region.bounds.max.x, region.bounds.min.y);
    viewport.line_might_be_visible(top_left, bottom_right)
}

fn fill_region(canvas: &mut BrailleCanvas, region: &Region, color: Color, viewport: &Viewport) {
    if !on_screen(region, viewport) {
        return;
    }
    let projected: Vec<Vec<DVec2>> = region
        .shape
        .rings()
        .map(|ring| ring.iter().map(|&p| viewport.project_point(p)).collect())
        .collect();
    fill_rings(canvas, projected.iter().map(Vec::as_slice), color);
}

fn outline_region(canvas: &mut BrailleCanvas, region: &Region, viewport: &Viewport) {
    if !on_screen(region, viewport) {
        return;
    }
    for ring in region.shape.rings() {
        draw_ring(canvas, ring, viewport);
    }
}

/// Draw a ring with per-segment culling
fn draw_ring(canvas: &mut BrailleCanvas, ring: &[DVec2], viewport: &Viewport) {
    if ring.len() < 2 {
        return;
    }

    let mut prev: Option<(i32, i32)> = None;

    for p in ring {
        let (px, py) = viewport.project(p.x, p.y);

        if let Some((prev_x, prev_y)) = prev {
            // Long jumps are antimeridian wraps, not real edges
            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
            if dist < viewport.width && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                draw_line(canvas, prev_x, prev_y, px, py);
            }
        }

        prev = Some((px, py));
    }
}
