//! GeoJSON reading and writing. Features that can't be used (missing fields, too-short
//! geometry) get skipped with a warning; non-finite numbers fail the whole run.

use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, Value};

use geom::{Distance, PolyLine, Pt2D};

use crate::{Sidewalk, Street};

/// Reads a FeatureCollection of LineStrings with `id`, `sw_left` and `sw_right` properties.
/// Also returns the collection's foreign members, so a legacy `crs` member can ride along to
/// the output untouched.
pub fn read_streets(path: &str) -> Result<(Vec<Street>, Option<JsonObject>)> {
    let raw = fs_err::read_to_string(path)?;
    let geojson: GeoJson = raw
        .parse()
        .with_context(|| format!("{} isn't valid GeoJSON", path))?;
    let collection = FeatureCollection::try_from(geojson)
        .with_context(|| format!("{} isn't a FeatureCollection", path))?;

    let mut streets = Vec::new();
    for (idx, feature) in collection.features.iter().enumerate() {
        if let Some(street) = parse_street(feature, idx)? {
            streets.push(street);
        }
    }
    Ok((streets, collection.foreign_members))
}

fn parse_street(feature: &Feature, idx: usize) -> Result<Option<Street>> {
    let line = match feature.geometry.as_ref().map(|g| &g.value) {
        Some(Value::LineString(line)) => line,
        _ => {
            warn!("Skipping feature {}: no LineString geometry", idx);
            return Ok(None);
        }
    };

    let mut pts = Vec::new();
    for position in line {
        if position.len() < 2 {
            warn!("Skipping feature {}: a coordinate isn't two-dimensional", idx);
            return Ok(None);
        }
        if !position[0].is_finite() || !position[1].is_finite() {
            bail!("Feature {} has a non-finite coordinate", idx);
        }
        pts.push(Pt2D::new(position[0], position[1]));
    }
    let geometry = match PolyLine::new(pts) {
        Ok(pl) => pl,
        Err(err) => {
            warn!("Skipping feature {}: {}", idx, err);
            return Ok(None);
        }
    };

    let id = match feature.property("id") {
        Some(serde_json::Value::String(id)) => id.clone(),
        Some(value) if !value.is_null() => value.to_string(),
        _ => {
            warn!("Skipping feature {}: no id property", idx);
            return Ok(None);
        }
    };

    let mut offsets = Vec::new();
    for key in ["sw_left", "sw_right"] {
        let Some(value) = feature.property(key).and_then(|value| value.as_f64()) else {
            warn!("Skipping feature {} ({}): no numeric {}", idx, id, key);
            return Ok(None);
        };
        if !value.is_finite() {
            bail!("Feature {} ({}) has a non-finite {}", idx, id, key);
        }
        if value < 0.0 {
            warn!("Skipping feature {} ({}): negative {}", idx, id, key);
            return Ok(None);
        }
        offsets.push(Distance::meters(value));
    }

    Ok(Some(Street {
        id,
        geometry,
        sw_left: offsets[0],
        sw_right: offsets[1],
    }))
}

/// Writes sidewalks as a FeatureCollection, carrying `foreign_members` (and so any `crs`)
/// through verbatim. Only the GeoJSON driver exists.
pub fn write_sidewalks(
    path: &str,
    sidewalks: Vec<Sidewalk>,
    driver: &str,
    foreign_members: Option<JsonObject>,
) -> Result<()> {
    if !driver.eq_ignore_ascii_case("geojson") {
        bail!("Unsupported output driver {}; only GeoJSON works", driver);
    }

    let features = sidewalks
        .into_iter()
        .map(|sidewalk| {
            let coords = sidewalk
                .geometry
                .points()
                .iter()
                .map(|pt| vec![pt.x(), pt.y()])
                .collect();
            let mut properties = JsonObject::new();
            properties.insert("street_id".to_string(), sidewalk.street_id.into());
            properties.insert("forward".to_string(), sidewalk.forward.into());
            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(Value::LineString(coords))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members,
    };
    fs_err::write(path, serde_json::to_string_pretty(&collection)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_junk_and_keeps_crs() {
        let input = r#"{
            "type": "FeatureCollection",
            "crs": { "type": "name", "properties": { "name": "EPSG:26910" } },
            "features": [
                {
                    "type": "Feature",
                    "properties": { "id": "good", "sw_left": 2.0, "sw_right": 0 },
                    "geometry": { "type": "LineString", "coordinates": [[0, 0], [10, 0]] }
                },
                {
                    "type": "Feature",
                    "properties": { "id": "short", "sw_left": 1, "sw_right": 1 },
                    "geometry": { "type": "LineString", "coordinates": [[5, 5]] }
                },
                {
                    "type": "Feature",
                    "properties": { "sw_left": 1, "sw_right": 1 },
                    "geometry": { "type": "LineString", "coordinates": [[0, 0], [1, 1]] }
                },
                {
                    "type": "Feature",
                    "properties": { "id": 42, "sw_left": 1, "sw_right": 1 },
                    "geometry": { "type": "LineString", "coordinates": [[0, 5], [5, 5]] }
                }
            ]
        }"#;
        let path = write_temp("streets2sidewalks_read_test.geojson", input);
        let (streets, foreign) = read_streets(&path).unwrap();

        assert_eq!(streets.len(), 2);
        assert_eq!(streets[0].id, "good");
        assert_eq!(streets[0].sw_left, Distance::meters(2.0));
        assert_eq!(streets[0].sw_right, Distance::ZERO);
        // Numeric ids work too
        assert_eq!(streets[1].id, "42");
        assert!(foreign.unwrap().contains_key("crs"));
    }

    #[test]
    fn round_trip_preserves_crs_and_properties() {
        let mut crs = JsonObject::new();
        crs.insert("crs".to_string(), serde_json::json!({"type": "name"}));
        let sidewalks = vec![Sidewalk {
            geometry: PolyLine::must_new(vec![Pt2D::new(0.0, 2.0), Pt2D::new(10.0, 2.0)]),
            street_id: "a".to_string(),
            forward: true,
        }];
        let path = std::env::temp_dir()
            .join("streets2sidewalks_write_test.geojson")
            .display()
            .to_string();
        write_sidewalks(&path, sidewalks, "GeoJSON", Some(crs)).unwrap();

        let raw = fs_err::read_to_string(&path).unwrap();
        let collection = FeatureCollection::try_from(raw.parse::<GeoJson>().unwrap()).unwrap();
        assert_eq!(collection.features.len(), 1);
        let feature = &collection.features[0];
        assert_eq!(
            feature.property("street_id"),
            Some(&serde_json::Value::String("a".to_string()))
        );
        assert_eq!(feature.property("forward"), Some(&serde_json::Value::Bool(true)));
        assert!(collection.foreign_members.unwrap().contains_key("crs"));
    }

    #[test]
    fn unknown_drivers_fail_cleanly() {
        let path = std::env::temp_dir()
            .join("streets2sidewalks_driver_test.shp")
            .display()
            .to_string();
        assert!(write_sidewalks(&path, Vec::new(), "Shapefile", None).is_err());
    }

    fn write_temp(name: &str, contents: &str) -> String {
        let path = std::env::temp_dir().join(name).display().to_string();
        fs_err::write(&path, contents).unwrap();
        path
    }
}
