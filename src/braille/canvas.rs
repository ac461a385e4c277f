use ratatui::style::Color;

/// Braille Unicode canvas for high-resolution terminal graphics.
/// Each character cell represents a 2x4 dot grid and carries one colour
/// (terminals can't colour individual dots).
/// Unicode Braille patterns: U+2800 to U+28FF
pub struct BrailleCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    dots: Vec<u8>, // Bit pattern per cell, row-major
    ink: Vec<Option<Color>>,
}

impl BrailleCanvas {
    /// Create a new canvas with the given character dimensions.
    /// Effective pixel resolution: width*2 x height*4
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            dots: vec![0; width * height],
            ink: vec![None; width * height],
        }
    }

    pub fn pixel_width(&self) -> usize {
        self.width * 2
    }

    pub fn pixel_height(&self) -> usize {
        self.height * 4
    }

    /// Cell index and dot bit for a pixel.
    /// Braille dot layout per character:
    /// ```text
    /// (0,0) (1,0)   bits: 0x01 0x08
    /// (0,1) (1,1)   bits: 0x02 0x10
    /// (0,2) (1,2)   bits: 0x04 0x20
    /// (0,3) (1,3)   bits: 0x40 0x80
    /// ```
    #[inline(always)]
    fn locate(&self, x: usize, y: usize) -> Option<(usize, u8)> {
        let (cx, cy) = (x / 2, y / 4);
        if cx >= self.width || cy >= self.height {
            return None;
        }
        let bit = match (x % 2, y % 4) {
            (0, 0) => 0x01,
            (1, 0) => 0x08,
            (0, 1) => 0x02,
            (1, 1) => 0x10,
            (0, 2) => 0x04,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            _ => 0x80,
        };
        Some((cy * self.width + cx, bit))
    }

    /// Set a dot without touching the cell colour
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        if let Some((idx, bit)) = self.locate(x, y) {
            self.dots[idx] |= bit;
        }
    }

    /// Set a pixel using signed coordinates (ignores negative values)
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    /// Set a dot and recolour its cell; the last colour written wins
    pub fn paint(&mut self, x: usize, y: usize, color: Color) {
        if let Some((idx, bit)) = self.locate(x, y) {
            self.dots[idx] |= bit;
            self.ink[idx] = Some(color);
        }
    }

    /// Paint the pixel row `y` from `x0` to `x1` inclusive, clipped to the canvas
    pub fn fill_span(&mut self, y: i32, x0: i32, x1: i32, color: Color) {
        if y < 0 || y as usize >= self.pixel_height() {
            return;
        }
        let start = x0.max(0);
        let end = x1.min(self.pixel_width() as i32 - 1);
        for x in start..=end {
            self.paint(x as usize, y as usize, color);
        }
    }

    /// Braille glyph and colour of a cell, or `None` if no dot is set
    pub fn cell(&self, col: usize, row: usize) -> Option<(char, Option<Color>)> {
        if col >= self.width || row >= self.height {
            return None;
        }
        let idx = row * self.width + col;
        let bits = self.dots[idx];
        if bits == 0 {
            return None;
        }
        let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
        Some((ch, self.ink[idx]))
    }

    /// Convert the canvas to a string of Braille characters
    #[cfg(test)]
    pub fn to_string(&self) -> String {
        self.dots
            .chunks(self.width.max(1))
            .map(|row| {
                row.iter()
                    .map(|&b| char::from_u32(0x2800 + b as u32).unwrap_or(' '))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
