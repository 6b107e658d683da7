//! Conversion of [`geojson`] geometries into [`Geom`].

use geojson::{LineStringType, PolygonType, Position, Value};

use crate::contour::{ClosedContour, Contour};
use crate::error::GeometryError;
use crate::geo::{GeoPoint2d, NewGeoPoint};
use crate::geometry::Geom;
use crate::polygon::Polygon;

impl TryFrom<&geojson::Geometry> for Geom {
    type Error = GeometryError;

    fn try_from(value: &geojson::Geometry) -> Result<Self, Self::Error> {
        Geom::try_from(&value.value)
    }
}

impl TryFrom<&Value> for Geom {
    type Error = GeometryError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Point(p) => Ok(Geom::Point(convert_position(p)?)),
            Value::MultiPoint(points) => Ok(Geom::MultiPoint(
                points
                    .iter()
                    .map(convert_position)
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            Value::LineString(line) => Ok(Geom::Contour(convert_contour(line)?)),
            Value::MultiLineString(lines) => Ok(Geom::MultiContour(
                lines
                    .iter()
                    .map(convert_contour)
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            Value::Polygon(polygon) => Ok(Geom::Polygon(convert_polygon(polygon)?)),
            Value::MultiPolygon(mp) => Ok(Geom::MultiPolygon(
                mp.iter()
                    .map(convert_polygon)
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            Value::GeometryCollection(_) => Err(GeometryError::Unsupported(
                "GeometryCollection".to_string(),
            )),
        }
    }
}

fn convert_position(position: &Position) -> Result<GeoPoint2d, GeometryError> {
    if position.len() < 2 {
        return Err(GeometryError::Conversion(
            "point must contain at least 2 dimensions".to_string(),
        ));
    }

    let point = GeoPoint2d::lonlat(position[0], position[1]);
    if !point.is_finite() {
        return Err(GeometryError::Conversion(
            "point coordinates must be finite".to_string(),
        ));
    }

    Ok(point)
}

fn convert_contour(line_string: &LineStringType) -> Result<Contour<GeoPoint2d>, GeometryError> {
    if line_string.len() < 2 {
        return Err(GeometryError::Conversion(
            "line string must contain at least 2 points".to_string(),
        ));
    }

    Ok(Contour::new(
        line_string
            .iter()
            .map(convert_position)
            .collect::<Result<Vec<_>, _>>()?,
    ))
}

fn convert_ring(ring: &LineStringType) -> Result<ClosedContour<GeoPoint2d>, GeometryError> {
    if ring.len() < 4 || ring.first() != ring.last() {
        return Err(GeometryError::Conversion(
            "polygon ring must be closed and contain at least 4 positions".to_string(),
        ));
    }

    Ok(ClosedContour::new(
        ring[..ring.len() - 1]
            .iter()
            .map(convert_position)
            .collect::<Result<Vec<_>, _>>()?,
    ))
}

fn convert_polygon(polygon: &PolygonType) -> Result<Polygon<GeoPoint2d>, GeometryError> {
    let Some((outer, inner)) = polygon.split_first() else {
        return Err(GeometryError::Conversion(
            "polygon must have an outer ring".to_string(),
        ));
    };

    Ok(Polygon::new(
        convert_ring(outer)?,
        inner
            .iter()
            .map(convert_ring)
            .collect::<Result<Vec<_>, _>>()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryKind;
    use crate::latlon;
    use assert_matches::assert_matches;

    fn parse(json: &str) -> Result<Geom, GeometryError> {
        let geometry: geojson::Geometry = serde_json::from_str(json).expect("valid geojson");
        Geom::try_from(&geometry)
    }

    #[test]
    fn point_axis_order() {
        let geom = parse(r#"{"type": "Point", "coordinates": [-74.2973, 4.5709]}"#);
        assert_eq!(geom, Ok(Geom::Point(latlon!(4.5709, -74.2973))));
    }

    #[test]
    fn polygon_drops_closing_point() {
        let geom = parse(
            r#"{"type": "Polygon", "coordinates": [[[0, 0], [2, 0], [2, 2], [0, 2], [0, 0]]]}"#,
        )
        .expect("valid polygon");
        assert_eq!(geom.kind(), GeometryKind::Polygon);
        assert_eq!(geom.iter_points().count(), 4);
    }

    #[test]
    fn multi_line_string() {
        let geom = parse(
            r#"{"type": "MultiLineString", "coordinates": [[[0, 0], [1, 1]], [[2, 2], [3, 3]]]}"#,
        )
        .expect("valid lines");
        assert_eq!(geom.kind(), GeometryKind::Polyline);
        assert_eq!(geom.iter_points().count(), 4);
    }

    #[test]
    fn open_ring_is_rejected() {
        let geom = parse(r#"{"type": "Polygon", "coordinates": [[[0, 0], [2, 0], [2, 2], [0, 2]]]}"#);
        assert_matches!(geom, Err(GeometryError::Conversion(_)));
    }

    #[test]
    fn geometry_collection_is_unsupported() {
        let geom = parse(r#"{"type": "GeometryCollection", "geometries": []}"#);
        assert_matches!(geom, Err(GeometryError::Unsupported(_)));
    }
}
