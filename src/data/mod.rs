mod tables;

pub use tables::{BanTable, FipsTable, Tables};

use crate::geo::Shape;
use crate::region::{Atlas, Region};
use anyhow::{bail, Context, Result};
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, GeoJson};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Load the state and county datasets into an atlas.
/// States are required; without counties the map still works but
/// selecting a state has nothing to distribute over.
pub fn load_atlas(states_path: &Path, counties_path: &Path) -> Result<Atlas> {
    let states = load_states(states_path)?;

    let counties = match load_counties(counties_path) {
        Ok(counties) => counties,
        Err(e) => {
            warn!("county drill-down disabled: {e:#}");
            Vec::new()
        }
    };

    let atlas = Atlas::new(states, counties);
    info!(
        states = atlas.states().len(),
        counties = atlas.counties().len(),
        "atlas ready"
    );
    Ok(atlas)
}

/// Load state polygons; the `name` property is both id and label
pub fn load_states(path: &Path) -> Result<Vec<Region>> {
    let fc = read_collection(path)?;
    Ok(states_from(fc))
}

/// Load county polygons keyed by 5-digit FIPS code
pub fn load_counties(path: &Path) -> Result<Vec<Region>> {
    let fc = read_collection(path)?;
    Ok(counties_from(fc))
}

fn read_collection(path: &Path) -> Result<FeatureCollection> {
    let mut bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    parse_collection(&mut bytes).with_context(|| format!("parsing {}", path.display()))
}

/// Parse a GeoJSON document that must be a FeatureCollection
pub fn parse_collection(bytes: &mut [u8]) -> Result<FeatureCollection> {
    match simd_json::serde::from_slice::<GeoJson>(bytes)? {
        GeoJson::FeatureCollection(fc) => Ok(fc),
        GeoJson::Feature(_) => bail!("expected a FeatureCollection, found a single Feature"),
        GeoJson::Geometry(_) => bail!("expected a FeatureCollection, found a bare Geometry"),
    }
}

pub fn states_from(fc: FeatureCollection) -> Vec<Region> {
    fc.features
        .into_par_iter()
        .filter_map(|feature| {
            let Some(name) = string_property(&feature, "name") else {
                warn!("skipping state feature without a name");
                return None;
            };
            Some(Region::new(name.clone(), name, shape_of(&feature)))
        })
        .collect()
}

pub fn counties_from(fc: FeatureCollection) -> Vec<Region> {
    fc.features
        .into_par_iter()
        .filter_map(|feature| {
            let Some(fips) = county_fips(&feature) else {
                warn!("skipping county feature without a FIPS id");
                return None;
            };
            let name = string_property(&feature, "NAME").unwrap_or_else(|| "Unknown".to_string());
            Some(Region::new(fips, name, shape_of(&feature)))
        })
        .collect()
}

fn shape_of(feature: &Feature) -> Shape {
    feature
        .geometry
        .as_ref()
        .map(|g| Shape::from_geojson(&g.value))
        .unwrap_or_default()
}

fn string_property(feature: &Feature, key: &str) -> Option<String> {
    feature
        .property(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

/// Feature id, or a `fips` property as a fallback. Numeric ids lose their
/// leading zero in some exports, so they are padded back to five digits.
fn county_fips(feature: &Feature) -> Option<String> {
    let fips = match &feature.id {
        Some(Id::String(s)) => s.trim().to_string(),
        Some(Id::Number(n)) => format!("{:05}", n.as_u64()?),
        None => string_property(feature, "fips")?,
    };
    (!fips.is_empty()).then_some(fips)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"name": "Texas"},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[2,0],[2,2],[0,2],[0,0]]]}},
            {"type": "Feature", "properties": {"density": 1.0},
             "geometry": {"type": "Polygon", "coordinates": [[[5,5],[6,5],[6,6],[5,5]]]}},
            {"type": "Feature", "properties": {"name": "Nowhere"}, "geometry": null}
        ]
    }"#;

    const COUNTIES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "id": "48001", "properties": {"NAME": "Anderson"},
             "geometry": {"type": "MultiPolygon", "coordinates": [[[[0,0],[1,0],[1,1],[0,1],[0,0]]]]}},
            {"type": "Feature", "id": 1001, "properties": {"NAME": "Autauga"},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
            {"type": "Feature", "properties": {"fips": "48003"},
             "geometry": {"type": "Point", "coordinates": [1, 1]}},
            {"type": "Feature", "properties": {"NAME": "Orphan"},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}}
        ]
    }"#;

    fn parse(doc: &str) -> FeatureCollection {
        let mut bytes = doc.as_bytes().to_vec();
        parse_collection(&mut bytes).unwrap()
    }

    #[test]
    fn test_states_need_a_name() {
        let states = states_from(parse(STATES));
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].id, "Texas");
        assert_eq!(states[0].shape.area(), 4.0);
        assert_eq!(states[1].name, "Nowhere");
        assert!(states[1].bounds.is_empty());
    }

    #[test]
    fn test_county_ids() {
        let counties = counties_from(parse(COUNTIES));
        let ids: Vec<&str> = counties.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["48001", "01001", "48003"]);
        assert_eq!(counties[1].name, "Autauga");
        assert_eq!(counties[2].name, "Unknown");
        assert_eq!(counties[2].shape, Shape::Empty);
    }

    #[test]
    fn test_rejects_single_feature() {
        let mut bytes = br#"{"type": "Feature", "properties": {}, "geometry": null}"#.to_vec();
        assert!(parse_collection(&mut bytes).is_err());
    }

    #[test]
    fn test_missing_counties_file_is_not_fatal() {
        let dir = std::env::temp_dir().join(format!("tui-bookbans-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let states = dir.join("states.json");
        fs::write(&states, STATES).unwrap();

        let atlas = load_atlas(&states, &dir.join("missing.json")).unwrap();
        assert_eq!(atlas.states().len(), 2);
        assert!(!atlas.has_counties());

        assert!(load_atlas(&dir.join("missing.json"), &states).is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
