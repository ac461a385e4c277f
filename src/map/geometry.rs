use glam::DVec2;
use ratatui::style::Color;

use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Scanline fill of projected rings with the even-odd rule, so holes stay
/// empty. Rings are in canvas pixel space; a pixel is filled when its
/// centre is inside.
pub fn fill_rings<'a>(canvas: &mut BrailleCanvas, rings: impl IntoIterator<Item = &'a [DVec2]>, color: Color) {
    let height = canvas.pixel_height() as i32;
    if height == 0 {
        return;
    }

    // Edge crossings bucketed per pixel row
    let mut rows: Vec<Vec<f64>> = vec![Vec::new(); height as usize];

    for ring in rings {
        for w in ring.windows(2) {
            let (lo, hi) = if w[0].y < w[1].y { (w[0], w[1]) } else { (w[1], w[0]) };
            if lo.y == hi.y {
                continue;
            }
            // Rows whose centre y + 0.5 lies in [lo.y, hi.y)
            let first = (lo.y - 0.5).ceil().max(0.0) as i32;
            let last = ((hi.y - 0.5).ceil() as i32 - 1).min(height - 1);
            let slope = (hi.x - lo.x) / (hi.y - lo.y);
            for y in first..=last {
                let sy = y as f64 + 0.5;
                rows[y as usize].push(lo.x + (sy - lo.y) * slope);
            }
        }
    }

    for (y, xs) in rows.iter_mut().enumerate() {
        if xs.len() < 2 {
            continue;
        }
        xs.sort_by(f64::total_cmp);
        for pair in xs.chunks_exact(2) {
            let x0 = (pair[0] - 0.5).ceil() as i32;
            let x1 = (pair[1] - 0.5).floor() as i32;
            canvas.fill_span(y as i32, x0, x1, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<DVec2> {
        vec![
            DVec2::new(x0, y0),
            DVec2::new(x1, y0),
            DVec2::new(x1, y1),
            DVec2::new(x0, y1),
            DVec2::new(x0, y0),
        ]
    }

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        assert_eq!(canvas.to_string(), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        assert_eq!(canvas.to_string(), "⡇\n⡇");
    }

    #[test]
    fn test_fill_whole_cell() {
        let mut canvas = BrailleCanvas::new(2, 1);
        let ring = rect(0.0, 0.0, 2.0, 4.0);
        fill_rings(&mut canvas, [ring.as_slice()], Color::Red);
        assert_eq!(canvas.to_string(), "⣿⠀");
        assert_eq!(canvas.cell(0, 0), Some(('⣿', Some(Color::Red))));
    }

    #[test]
    fn test_fill_leaves_hole_empty() {
        let mut canvas = BrailleCanvas::new(3, 3);
        let outer = rect(0.0, 0.0, 6.0, 12.0);
        let hole = rect(2.0, 4.0, 4.0, 8.0);
        fill_rings(&mut canvas, [outer.as_slice(), hole.as_slice()], Color::Red);
        assert_eq!(canvas.cell(1, 1), None);
        assert!(canvas.cell(0, 1).is_some());
        assert!(canvas.cell(2, 2).is_some());
    }

    #[test]
    fn test_fill_clips_offscreen_geometry() {
        let mut canvas = BrailleCanvas::new(1, 1);
        let ring = rect(-100.0, -100.0, 100.0, 100.0);
        fill_rings(&mut canvas, [ring.as_slice()], Color::Red);
        assert_eq!(canvas.to_string(), "⣿");
    }
}
