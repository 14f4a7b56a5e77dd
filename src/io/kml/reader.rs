use crate::error::{GeodexError, Result};
use crate::geometry::{
    CoordSeq, Geometry, GeometryType, GeometryValue, LineString, LinearRing, Point, Polygon,
};
use crate::io::reject_at;
use crate::io::xml::{parse_coordinate_tuples, parse_document, Element};

const GEOMETRY_ELEMENTS: [&str; 5] = [
    "Point",
    "LineString",
    "LinearRing",
    "Polygon",
    "MultiGeometry",
];

fn is_geometry(element: &Element) -> bool {
    GEOMETRY_ELEMENTS.contains(&element.name.as_str())
}

fn coordinates(element: &Element) -> Result<CoordSeq> {
    let coordinates = element.child("coordinates").ok_or_else(|| {
        GeodexError::parse(
            element.offset,
            format!("<{}> has no <coordinates>", element.name),
        )
    })?;
    parse_coordinate_tuples(&coordinates.text, coordinates.offset)
}

fn ring(element: &Element) -> Result<LinearRing> {
    LinearRing::try_new(coordinates(element)?).map_err(|e| reject_at(element.offset, e))
}

/// Every `<LinearRing>` inside the boundary elements called `boundary`.
fn boundary_rings(polygon: &Element, boundary: &str) -> Result<Vec<LinearRing>> {
    polygon
        .children_named(boundary)
        .flat_map(|b| b.children_named("LinearRing"))
        .map(ring)
        .collect()
}

fn polygon(element: &Element) -> Result<Polygon> {
    let mut shells = boundary_rings(element, "outerBoundaryIs")?.into_iter();
    let shell = shells.next().ok_or_else(|| {
        GeodexError::parse(element.offset, "<Polygon> has no <outerBoundaryIs> ring")
    })?;
    Ok(Polygon::new(
        shell,
        boundary_rings(element, "innerBoundaryIs")?,
    ))
}

/// The collection kind a MultiGeometry maps to: a multi kind when every part has the same
/// single kind, otherwise a GeometryCollection.
fn multi_kind(parts: &[Geometry]) -> GeometryType {
    let kind = match parts.first().map(Geometry::geometry_type) {
        Some(GeometryType::Point) => GeometryType::MultiPoint,
        Some(GeometryType::LineString) => GeometryType::MultiLineString,
        Some(GeometryType::Polygon) => GeometryType::MultiPolygon,
        _ => return GeometryType::GeometryCollection,
    };
    let first = parts[0].geometry_type();
    if parts.iter().all(|part| part.geometry_type() == first) {
        kind
    } else {
        GeometryType::GeometryCollection
    }
}

fn kml_geometry(element: &Element) -> Result<Geometry> {
    let value = match element.name.as_str() {
        "Point" => {
            let coords = coordinates(element)?;
            let coord = coords.first().ok_or_else(|| {
                GeodexError::parse(element.offset, "<Point> has no coordinate")
            })?;
            GeometryValue::Point(Point::from(coord))
        }
        "LineString" => GeometryValue::LineString(
            LineString::try_new(coordinates(element)?)
                .map_err(|e| reject_at(element.offset, e))?,
        ),
        "LinearRing" => GeometryValue::LinearRing(ring(element)?),
        "Polygon" => GeometryValue::Polygon(polygon(element)?),
        "MultiGeometry" => {
            let parts = element
                .children
                .iter()
                .filter(|child| is_geometry(child))
                .map(kml_geometry)
                .collect::<Result<Vec<_>>>()?;
            return Geometry::collection(multi_kind(&parts), parts)
                .map_err(|e| reject_at(element.offset, e));
        }
        other => {
            return Err(GeodexError::parse(
                element.offset,
                format!("<{other}> is not a KML geometry"),
            ))
        }
    };
    Ok(Geometry::new(value))
}

/// Decode the first KML geometry element in a fragment or full document.
///
/// # Errors
///
/// - [`GeodexError::Parse`] for malformed XML, for input without a geometry element, and for
///   invalid coordinates
pub fn read_kml(text: &str) -> Result<Geometry> {
    let root = parse_document(text)?;
    let element = root
        .find(&is_geometry)
        .ok_or_else(|| GeodexError::parse(0, "no KML geometry element found"))?;
    kml_geometry(element)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test::{multilinestring, polygon};

    #[test]
    fn point_fragment() {
        let geom = read_kml("<Point><coordinates>30,10,0</coordinates></Point>").unwrap();
        assert_eq!(geom, Geometry::point(30., 10.));
    }

    #[test]
    fn polygon_with_hole() {
        let text = r#"<Polygon>
            <outerBoundaryIs><LinearRing>
              <coordinates>35,10 45,45 15,40 10,20 35,10</coordinates>
            </LinearRing></outerBoundaryIs>
            <innerBoundaryIs><LinearRing>
              <coordinates>20,30 35,35 30,20 20,30</coordinates>
            </LinearRing></innerBoundaryIs>
        </Polygon>"#;
        assert_eq!(
            read_kml(text).unwrap(),
            Geometry::from(polygon::p_with_hole())
        );
    }

    #[test]
    fn full_document() {
        let text = r#"<?xml version="1.0" encoding="UTF-8"?>
        <kml xmlns="http://www.opengis.net/kml/2.2">
          <Document><Placemark>
            <name>line</name>
            <LineString><tessellate>1</tessellate>
              <coordinates>
                -122.364,37.824,0 -122.363,37.823,0
              </coordinates>
            </LineString>
          </Placemark></Document>
        </kml>"#;
        let geom = read_kml(text).unwrap();
        assert_eq!(
            geom,
            Geometry::line_string(vec![(-122.364, 37.824), (-122.363, 37.823)]).unwrap()
        );
    }

    #[test]
    fn homogeneous_multi_geometry() {
        let text = "<MultiGeometry>\
            <LineString><coordinates>10,10 20,20 10,40</coordinates></LineString>\
            <LineString><coordinates>40,40 30,30 40,20 30,10</coordinates></LineString>\
            </MultiGeometry>";
        assert_eq!(read_kml(text).unwrap(), multilinestring::mls0());
    }

    #[test]
    fn mixed_multi_geometry() {
        let text = "<MultiGeometry>\
            <Point><coordinates>1,2</coordinates></Point>\
            <LineString><coordinates>0,0 1,1</coordinates></LineString>\
            </MultiGeometry>";
        let geom = read_kml(text).unwrap();
        assert_eq!(geom.geometry_type(), GeometryType::GeometryCollection);
    }

    #[test]
    fn errors() {
        for text in [
            "<Placemark><name>nothing</name></Placemark>",
            "<Point></Point>",
            "<Point><coordinates>1</coordinates></Point>",
            "<LineString><coordinates>1,2</coordinates></LineString>",
            "<Polygon></Polygon>",
            "<Point><coordinates>1,2</coordinates>",
        ] {
            assert_eq!(
                read_kml(text).unwrap_err().kind(),
                ErrorKind::ParseError,
                "{text}"
            );
        }
    }
}
