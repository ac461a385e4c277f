use ratatui::style::Color;

/// Sequential red ramp keyed on log10(count + 1)
const STOPS: [(f64, [u8; 3]); 6] = [
    (0.0, [0xff, 0xf5, 0xf0]),
    (0.5, [0xfc, 0xbb, 0xa1]),
    (1.0, [0xfc, 0x92, 0x72]),
    (1.5, [0xfb, 0x6a, 0x4a]),
    (2.0, [0xde, 0x2d, 0x26]),
    (2.5, [0xa5, 0x0f, 0x15]),
];

/// Fill colour for a ban count
pub fn ramp_color(count: u64) -> Color {
    let [r, g, b] = ramp_rgb((count as f64 + 1.0).log10());
    Color::Rgb(r, g, b)
}

/// Linear interpolation between stops, clamped at both ends
pub fn ramp_rgb(t: f64) -> [u8; 3] {
    let (first_t, first) = STOPS[0];
    let (last_t, last) = STOPS[STOPS.len() - 1];
    if !(t > first_t) {
        return first;
    }
    if t >= last_t {
        return last;
    }

    for w in STOPS.windows(2) {
        let ((t0, c0), (t1, c1)) = (w[0], w[1]);
        if t <= t1 {
            let f = (t - t0) / (t1 - t0);
            let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
            return [lerp(c0[0], c1[0]), lerp(c0[1], c1[1]), lerp(c0[2], c1[2])];
        }
    }
    last
}

/// Counts at each stop, for the legend
pub fn legend() -> impl Iterator<Item = (u64, Color)> {
    STOPS.iter().map(|&(t, [r, g, b])| {
        let count = (10f64.powf(t) - 1.0).round() as u64;
        (count, Color::Rgb(r, g, b))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn luma([r, g, b]: [u8; 3]) -> f64 {
        0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
    }

    #[test]
    fn test_zero_is_lightest() {
        assert_eq!(ramp_color(0), Color::Rgb(0xff, 0xf5, 0xf0));
    }

    #[test]
    fn test_clamps_above_last_stop() {
        assert_eq!(ramp_color(8837), Color::Rgb(0xa5, 0x0f, 0x15));
        assert_eq!(ramp_rgb(f64::NAN), [0xff, 0xf5, 0xf0]);
    }

    #[test]
    fn test_exact_stop() {
        // log10(9 + 1) = 1.0
        assert_eq!(ramp_color(9), Color::Rgb(0xfc, 0x92, 0x72));
    }

    #[test]
    fn test_darkens_with_count() {
        let mut prev = f64::INFINITY;
        for t in [0.0, 0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 2.25, 2.5] {
            let l = luma(ramp_rgb(t));
            assert!(l < prev, "luma at {t} = {l}");
            prev = l;
        }
    }

    #[test]
    fn test_legend_counts() {
        let counts: Vec<u64> = legend().map(|(n, _)| n).collect();
        assert_eq!(counts, vec![0, 2, 9, 31, 99, 315]);
    }
}
