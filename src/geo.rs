use glam::DVec2;

/// A closed ring of lon/lat coordinates (first point repeated at the end)
pub type Ring = Vec<DVec2>;

/// Outer ring followed by zero or more hole rings
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    pub rings: Vec<Ring>,
}

/// Region geometry. Anything that isn't a polygon collapses to `Empty`.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Shape {
    #[default]
    Empty,
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

/// Unsigned shoelace area of a closed ring, in squared coordinate units.
/// Only meaningful as a relative weight: degrees are not an equal-area unit.
#[inline]
pub fn ring_area(ring: &[DVec2]) -> f64 {
    let sum: f64 = ring.windows(2).map(|w| w[0].perp_dot(w[1])).sum();
    sum.abs() * 0.5
}

/// Planar area of any shape; `Shape::Empty` is zero
#[inline]
pub fn area(shape: &Shape) -> f64 {
    shape.area()
}

impl Polygon {
    /// Outer ring minus holes, never negative (self-intersecting input can
    /// produce holes larger than the outline)
    pub fn area(&self) -> f64 {
        let Some((outer, holes)) = self.rings.split_first() else {
            return 0.0;
        };
        let holes: f64 = holes.iter().map(|h| ring_area(h)).sum();
        (ring_area(outer) - holes).max(0.0)
    }

    /// Even-odd test across the outer ring and its holes
    pub fn contains(&self, p: DVec2) -> bool {
        let mut inside = false;
        for ring in &self.rings {
            for w in ring.windows(2) {
                let (a, b) = (w[0], w[1]);
                if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

impl Shape {
    /// Convert a GeoJSON geometry value; non-polygonal types become `Empty`
    pub fn from_geojson(value: &geojson::Value) -> Self {
        match value {
            geojson::Value::Polygon(rings) => Shape::Polygon(to_polygon(rings)),
            geojson::Value::MultiPolygon(parts) => {
                Shape::MultiPolygon(parts.iter().map(|rings| to_polygon(rings)).collect())
            }
            _ => Shape::Empty,
        }
    }

    pub fn area(&self) -> f64 {
        match self {
            Shape::Empty => 0.0,
            Shape::Polygon(p) => p.area(),
            Shape::MultiPolygon(parts) => parts.iter().map(Polygon::area).sum(),
        }
    }

    /// All polygons of the shape (one for `Polygon`, none for `Empty`)
    pub fn polygons(&self) -> &[Polygon] {
        match self {
            Shape::Empty => &[],
            Shape::Polygon(p) => std::slice::from_ref(p),
            Shape::MultiPolygon(parts) => parts,
        }
    }

    /// Every ring of every part, outer rings and holes alike
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        self.polygons().iter().flat_map(|p| p.rings.iter())
    }

    pub fn contains(&self, p: DVec2) -> bool {
        self.polygons().iter().any(|poly| poly.contains(p))
    }

    pub fn bounds(&self) -> Bounds {
        let mut b = Bounds::EMPTY;
        b.extend_shape(self);
        b
    }
}

fn to_polygon(rings: &[Vec<Vec<f64>>]) -> Polygon {
    Polygon {
        rings: rings.iter().map(|line| to_ring(line)).collect(),
    }
}

fn to_ring(line: &[Vec<f64>]) -> Ring {
    line.iter()
        .filter_map(|pos| match pos.as_slice() {
            [x, y, ..] => Some(DVec2::new(*x, *y)),
            _ => None,
        })
        .collect()
}

/// Axis-aligned lon/lat bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    pub const EMPTY: Self = Self {
        min: DVec2::splat(f64::INFINITY),
        max: DVec2::splat(f64::NEG_INFINITY),
    };

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    #[inline]
    pub fn extend(&mut self, p: DVec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Grow to cover every coordinate of the shape, holes included
    pub fn extend_shape(&mut self, shape: &Shape) {
        match shape {
            Shape::Empty => {}
            Shape::Polygon(_) | Shape::MultiPolygon(_) => {
                for ring in shape.rings() {
                    for &p in ring {
                        self.extend(p);
                    }
                }
            }
        }
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[inline]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(points: &[[f64; 2]]) -> Ring {
        points.iter().map(|&[x, y]| DVec2::new(x, y)).collect()
    }

    fn square() -> Ring {
        ring(&[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [0.0, 0.0]])
    }

    fn small_hole() -> Ring {
        ring(&[[0.5, 0.5], [1.0, 0.5], [1.0, 1.0], [0.5, 1.0], [0.5, 0.5]])
    }

    #[test]
    fn test_square_area() {
        let shape = Shape::Polygon(Polygon { rings: vec![square()] });
        assert_eq!(area(&shape), 4.0);
    }

    #[test]
    fn test_hole_subtracted() {
        let solid = Shape::Polygon(Polygon { rings: vec![square()] });
        let holed = Shape::Polygon(Polygon { rings: vec![square(), small_hole()] });
        assert_eq!(area(&holed), 3.75);
        assert!(area(&holed) < area(&solid));
    }

    #[test]
    fn test_winding_direction_ignored() {
        let mut reversed = square();
        reversed.reverse();
        assert_eq!(ring_area(&reversed), 4.0);
    }

    #[test]
    fn test_oversized_hole_floors_at_zero() {
        let big = ring(&[[-1.0, -1.0], [3.0, -1.0], [3.0, 3.0], [-1.0, 3.0], [-1.0, -1.0]]);
        let shape = Shape::Polygon(Polygon { rings: vec![square(), big] });
        assert_eq!(area(&shape), 0.0);
    }

    #[test]
    fn test_multipolygon_parts_floored_independently() {
        let big = ring(&[[-1.0, -1.0], [3.0, -1.0], [3.0, 3.0], [-1.0, 3.0], [-1.0, -1.0]]);
        let broken = Polygon { rings: vec![square(), big] };
        let good = Polygon { rings: vec![square()] };
        let empty = Polygon { rings: vec![] };
        let shape = Shape::MultiPolygon(vec![broken, good, empty]);
        assert_eq!(area(&shape), 4.0);
    }

    #[test]
    fn test_empty_and_unknown_geometry() {
        assert_eq!(area(&Shape::Empty), 0.0);
        assert_eq!(area(&Shape::Polygon(Polygon::default())), 0.0);
        let point = geojson::Value::Point(vec![1.0, 2.0]);
        assert_eq!(area(&Shape::from_geojson(&point)), 0.0);
    }

    #[test]
    fn test_from_geojson_polygon() {
        let value = geojson::Value::Polygon(vec![vec![
            vec![0.0, 0.0],
            vec![2.0, 0.0],
            vec![2.0, 2.0],
            vec![0.0, 2.0],
            vec![0.0, 0.0],
        ]]);
        let shape = Shape::from_geojson(&value);
        assert_eq!(shape.area(), 4.0);
        assert_eq!(shape.polygons().len(), 1);
    }

    #[test]
    fn test_bounds_cover_all_parts() {
        let far = ring(&[[10.0, 10.0], [11.0, 10.0], [11.0, 12.0], [10.0, 10.0]]);
        let shape = Shape::MultiPolygon(vec![
            Polygon { rings: vec![square()] },
            Polygon { rings: vec![far] },
        ]);
        let b = shape.bounds();
        assert_eq!(b.min, DVec2::new(0.0, 0.0));
        assert_eq!(b.max, DVec2::new(11.0, 12.0));
        assert!(Shape::Empty.bounds().is_empty());
    }

    #[test]
    fn test_contains_respects_holes() {
        let shape = Shape::Polygon(Polygon { rings: vec![square(), small_hole()] });
        assert!(shape.contains(DVec2::new(1.5, 1.5)));
        assert!(!shape.contains(DVec2::new(0.75, 0.75)));
        assert!(!shape.contains(DVec2::new(3.0, 1.0)));
    }
}
