use glam::DVec2;
use tracing::{debug, info};

use crate::alloc::{allocate_with, FallbackPolicy};
use crate::data::Tables;
use crate::map::{Focus, MapRenderer, Viewport};
use crate::region::{Atlas, Estimates};

/// Braille pixels kept clear around a state when zooming to it
const FIT_PADDING: usize = 8;

/// The state whose counties are on display
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub state: usize,
    pub fips: String,
    pub total: u64,
    pub counties: Vec<usize>,
}

/// Popup contents for whatever is under the cursor
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hover {
    pub title: String,
    pub detail: String,
}

/// Application state
pub struct App {
    pub viewport: Viewport,
    pub atlas: Atlas,
    pub tables: Tables,
    pub fallback: FallbackPolicy,
    pub map_renderer: MapRenderer,
    pub selection: Option<Selection>,
    pub estimates: Estimates,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for cursor marker
    pub mouse_pos: Option<(u16, u16)>,
    /// Whether the current press has turned into a drag
    dragged: bool,
}

impl App {
    pub fn new(atlas: Atlas, tables: Tables, fallback: FallbackPolicy, width: usize, height: usize) -> Self {
        let (pixel_width, pixel_height) = Self::map_pixels(width, height);
        Self {
            viewport: Viewport::conus(pixel_width, pixel_height),
            atlas,
            tables,
            fallback,
            map_renderer: MapRenderer::new(),
            selection: None,
            estimates: Estimates::default(),
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
            dragged: false,
        }
    }

    /// Braille resolution of the map area inside the border and above the
    /// status bar
    fn map_pixels(width: usize, height: usize) -> (usize, usize) {
        let inner_width = width.saturating_sub(2);
        let inner_height = height.saturating_sub(3); // 2 for border + 1 for status bar
        (inner_width * 2, inner_height * 4)
    }

    /// Terminal cell to braille pixel, accounting for the 1-cell border
    #[inline]
    fn cell_to_pixel(col: u16, row: u16) -> (i32, i32) {
        let px = (col.saturating_sub(1) as i32) * 2;
        let py = (row.saturating_sub(1) as i32) * 4;
        (px, py)
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        let (pixel_width, pixel_height) = Self::map_pixels(width, height);
        self.viewport.width = pixel_width;
        self.viewport.height = pixel_height;
    }

    /// Pan the map
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    /// Zoom in
    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    /// Zoom out
    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = Self::cell_to_pixel(col, row);
        self.viewport.zoom_in_at(px, py);
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = Self::cell_to_pixel(col, row);
        self.viewport.zoom_out_at(px, py);
    }

    /// Back to the opening view, keeping the selection
    pub fn reset_view(&mut self) {
        self.viewport = Viewport::conus(self.viewport.width, self.viewport.height);
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    /// Get current center coordinates as a string
    pub fn center_coords(&self) -> String {
        format!(
            "{:.1}°{}, {:.1}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }

    /// Mouse button went down: maybe a click, maybe the start of a drag
    pub fn press(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        self.dragged = false;
    }

    /// Handle mouse drag by panning
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - x as i32;
            let dy = last_y as i32 - y as i32;
            if dx != 0 || dy != 0 {
                self.dragged = true;
            }
            // One terminal cell is 2x4 braille pixels
            self.pan(dx * 2, dy * 4);
        }
        self.last_mouse = Some((x, y));
    }

    /// Mouse button released; a press without a drag counts as a click
    pub fn release(&mut self, col: u16, row: u16) {
        if self.last_mouse.is_some() && !self.dragged {
            self.click(col, row);
        }
        self.last_mouse = None;
        self.dragged = false;
    }

    /// Update mouse cursor position
    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Get mouse position in braille pixel coordinates (for rendering marker)
    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos.map(|(col, row)| Self::cell_to_pixel(col, row))
    }

    /// Lon/lat under a terminal cell
    fn lonlat_at(&self, col: u16, row: u16) -> DVec2 {
        let (px, py) = Self::cell_to_pixel(col, row);
        // Sample the middle of the 2x4 dot block
        self.viewport
            .unproject_point(DVec2::new(px as f64 + 1.0, py as f64 + 2.0))
    }

    /// Select the state under a terminal cell. Returns true if something
    /// was selected.
    pub fn click(&mut self, col: u16, row: u16) -> bool {
        let p = self.lonlat_at(col, row);
        match self.atlas.state_at(p) {
            Some(idx) => self.select_state(idx),
            None => false,
        }
    }

    /// Distribute a state's total over its counties and zoom to it.
    /// States without a FIPS code are ignored.
    pub fn select_state(&mut self, idx: usize) -> bool {
        let Some(state) = self.atlas.states().get(idx) else {
            return false;
        };
        let Some(fips) = self.tables.fips.get(&state.name) else {
            debug!(state = %state.name, "no FIPS code, ignoring selection");
            return false;
        };

        let total = self.tables.bans.get(&state.name);
        let counties = self.atlas.counties_of(fips);
        let shares = allocate_with(total, &self.atlas.children(&counties), self.fallback);
        info!(
            state = %state.name,
            fips,
            total,
            counties = counties.len(),
            "allocated county estimates"
        );

        self.estimates.merge(shares);
        self.viewport.fit_bounds(&state.bounds, FIT_PADDING);
        self.selection = Some(Selection {
            state: idx,
            fips: fips.to_string(),
            total,
            counties,
        });
        true
    }

    /// Drop the county view; estimates stay cached
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Renderer view of the current selection
    pub fn focus(&self) -> Option<Focus<'_>> {
        self.selection.as_ref().map(|sel| Focus {
            state: sel.state,
            counties: &sel.counties,
            estimates: &self.estimates,
        })
    }

    /// Popup for the region under the mouse. Counties of the selected state
    /// take precedence over states.
    pub fn hover(&self) -> Option<Hover> {
        let (col, row) = self.mouse_pos?;
        let p = self.lonlat_at(col, row);

        if let Some(sel) = &self.selection {
            if self.map_renderer.settings.show_counties {
                if let Some(idx) = self.atlas.county_at(p, &sel.counties) {
                    let county = &self.atlas.counties()[idx];
                    return Some(Hover {
                        title: county.name.clone(),
                        detail: format!("Estimated book bans: {}", self.estimates.get(&county.id)),
                    });
                }
            }
        }

        let state = &self.atlas.states()[self.atlas.state_at(p)?];
        Some(Hover {
            title: state.name.clone(),
            detail: format!("Book bans: {}", self.tables.bans.get(&state.name)),
        })
    }

    /// One-line description of the selection for the status bar
    pub fn selection_summary(&self) -> Option<String> {
        let sel = self.selection.as_ref()?;
        let state = self.atlas.states().get(sel.state)?;
        let shown = self
            .estimates
            .total(sel.counties.iter().map(|&c| self.atlas.counties()[c].id.as_str()));
        Some(format!(
            "{}: {} bans over {} counties ({} placed)",
            state.name,
            sel.total,
            sel.counties.len(),
            shown
        ))
    }
}
