use std::f64::consts::PI;

use glam::DVec2;

use crate::geo::Bounds;

const MIN_ZOOM: f64 = 0.5;
const MAX_ZOOM: f64 = 200.0;
/// Web Mercator is undefined at the poles
const MAX_LAT: f64 = 85.0511;

/// Viewport representing the visible map area and zoom level
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-90 to 90)
    pub center_lat: f64,
    /// Zoom level (1.0 = whole world across the canvas width)
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

/// Normalized Web Mercator x in [0, 1]
#[inline(always)]
fn mercator_x(lon: f64) -> f64 {
    (lon + 180.0) / 360.0
}

/// Normalized Web Mercator y in [0, 1], growing southward
#[inline(always)]
fn mercator_y(lat: f64) -> f64 {
    let lat_rad = lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

#[inline(always)]
fn lat_from_mercator_y(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees()
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
        }
    }

    /// Contiguous US framed the way the web map opens
    pub fn conus(width: usize, height: usize) -> Self {
        Self::new(-98.0, 38.0, 5.0, width, height)
    }

    #[inline(always)]
    fn scale(&self) -> f64 {
        self.zoom * self.width as f64
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let center_x = mercator_x(self.center_lon) + dx as f64 / self.scale();
        let center_y = mercator_y(self.center_lat) + dy as f64 / self.scale();

        self.center_lon = center_x * 360.0 - 180.0;
        // Wrap longitude
        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }
        self.center_lat = lat_from_mercator_y(center_y).clamp(-85.0, 85.0);
    }

    /// Zoom in by a factor
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(MAX_ZOOM);
    }

    /// Zoom out by a factor
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(MIN_ZOOM);
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.5);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / 1.5);
    }

    /// Zoom by factor keeping the point under the cursor fixed
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let (lon, lat) = self.unproject(px, py);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Centre on `bounds` and zoom so it fits with `padding` pixels spare on
    /// every side. Empty bounds leave the viewport untouched.
    pub fn fit_bounds(&mut self, bounds: &Bounds, padding: usize) {
        if bounds.is_empty() || self.width == 0 || self.height == 0 {
            return;
        }

        let left = mercator_x(bounds.min.x);
        let right = mercator_x(bounds.max.x);
        let top = mercator_y(bounds.max.y);
        let bottom = mercator_y(bounds.min.y);

        let span_x = (right - left).max(1e-9);
        let span_y = (bottom - top).max(1e-9);
        let avail_w = self.width.saturating_sub(2 * padding).max(1) as f64;
        let avail_h = self.height.saturating_sub(2 * padding).max(1) as f64;

        let scale = (avail_w / span_x).min(avail_h / span_y);
        self.zoom = (scale / self.width as f64).clamp(MIN_ZOOM, MAX_ZOOM);
        self.center_lon = (bounds.min.x + bounds.max.x) / 2.0;
        self.center_lat = lat_from_mercator_y((top + bottom) / 2.0);
    }

    /// Unproject pixel coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let p = self.unproject_point(DVec2::new(px as f64, py as f64));
        (p.x, p.y)
    }

    pub fn unproject_point(&self, px: DVec2) -> DVec2 {
        let x = (px.x - self.width as f64 / 2.0) / self.scale() + mercator_x(self.center_lon);
        let y = (px.y - self.height as f64 / 2.0) / self.scale() + mercator_y(self.center_lat);
        DVec2::new(x * 360.0 - 180.0, lat_from_mercator_y(y))
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let p = self.project_point(DVec2::new(lon, lat));
        (p.x as i32, p.y as i32)
    }

    /// Sub-pixel projection, used for scanline fills
    pub fn project_point(&self, lonlat: DVec2) -> DVec2 {
        let x = (mercator_x(lonlat.x) - mercator_x(self.center_lon)) * self.scale() + self.width as f64 / 2.0;
        let y = (mercator_y(lonlat.y) - mercator_y(self.center_lat)) * self.scale() + self.height as f64 / 2.0;
        DVec2::new(x, y)
    }

    /// Lon/lat box currently on screen
    pub fn visible_bounds(&self) -> Bounds {
        let top_left = self.unproject_point(DVec2::ZERO);
        let bottom_right = self.unproject_point(DVec2::new(self.width as f64, self.height as f64));
        Bounds {
            min: DVec2::new(top_left.x, bottom_right.y),
            max: DVec2::new(bottom_right.x, top_left.y),
        }
    }

    /// Check if a line segment might be visible (rough bounding box check)
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0 && min_x < self.width as i32 && max_y >= 0 && min_y < self.height as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        let (x, y) = vp.project(0.0, 0.0);
        assert_eq!(x, 50);
        assert_eq!(y, 50);
    }

    #[test]
    fn test_pan() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon > 0.0);
        vp.pan(0, 10);
        assert!(vp.center_lat < 0.0);
    }

    #[test]
    fn test_unproject_inverts_project() {
        let vp = Viewport::conus(400, 200);
        let p = vp.project_point(DVec2::new(-87.6, 41.9));
        let back = vp.unproject_point(p);
        assert!((back.x + 87.6).abs() < 1e-9);
        assert!((back.y - 41.9).abs() < 1e-9);
    }

    #[test]
    fn test_fit_bounds_frames_box() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 200, 100);
        let texas = Bounds {
            min: DVec2::new(-106.6, 25.8),
            max: DVec2::new(-93.5, 36.5),
        };
        vp.fit_bounds(&texas, 8);

        let top_left = vp.project_point(DVec2::new(texas.min.x, texas.max.y));
        let bottom_right = vp.project_point(DVec2::new(texas.max.x, texas.min.y));
        for p in [top_left, bottom_right] {
            assert!(p.x >= 7.99 && p.x <= 192.01, "x = {}", p.x);
            assert!(p.y >= 7.99 && p.y <= 92.01, "y = {}", p.y);
        }
        // Height is the tight axis for Texas on a wide canvas
        assert!((bottom_right.y - top_left.y - 84.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_empty_bounds_is_noop() {
        let mut vp = Viewport::conus(200, 100);
        let before = vp.clone();
        vp.fit_bounds(&Bounds::EMPTY, 8);
        assert_eq!(vp, before);
    }

    #[test]
    fn test_visible_bounds_contains_center() {
        let vp = Viewport::conus(200, 100);
        let b = vp.visible_bounds();
        assert!(b.contains(DVec2::new(-98.0, 38.0)));
        assert!(!b.contains(DVec2::new(10.0, 50.0)));
    }
}
