use itertools::Itertools;

use crate::geometry::{CoordSeq, Geometry, GeometryValue, LinearRing, Point, Polygon};
use crate::io::format_number;

const GML_NAMESPACE: &str = "http://www.opengis.net/gml";

/// The GML dialect to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GmlVersion {
    /// GML 2: `gml:coordinates` tuples and `outerBoundaryIs`/`innerBoundaryIs`.
    V2,
    /// GML 3: `gml:pos`/`gml:posList`, `exterior`/`interior` and the curve and surface
    /// collections.
    V3,
}

struct GmlWriter {
    version: GmlVersion,
    precision: Option<usize>,
}

impl GmlWriter {
    fn number(&self, value: f64) -> String {
        format_number(value, self.precision)
    }

    fn coords(&self, coords: &CoordSeq) -> String {
        match self.version {
            GmlVersion::V2 => format!(
                "<gml:coordinates>{}</gml:coordinates>",
                coords
                    .iter()
                    .map(|c| format!("{},{}", self.number(c.x), self.number(c.y)))
                    .join(" ")
            ),
            GmlVersion::V3 => format!(
                "<gml:posList>{}</gml:posList>",
                coords
                    .iter()
                    .map(|c| format!("{} {}", self.number(c.x), self.number(c.y)))
                    .join(" ")
            ),
        }
    }

    fn point_body(&self, point: &Point) -> String {
        match self.version {
            GmlVersion::V2 => format!(
                "<gml:coordinates>{},{}</gml:coordinates>",
                self.number(point.x),
                self.number(point.y)
            ),
            GmlVersion::V3 => format!(
                "<gml:pos>{} {}</gml:pos>",
                self.number(point.x),
                self.number(point.y)
            ),
        }
    }

    fn ring(&self, ring: &LinearRing) -> String {
        format!(
            "<gml:LinearRing>{}</gml:LinearRing>",
            self.coords(ring.coords())
        )
    }

    fn polygon_body(&self, polygon: &Polygon) -> String {
        let (outer, inner) = match self.version {
            GmlVersion::V2 => ("outerBoundaryIs", "innerBoundaryIs"),
            GmlVersion::V3 => ("exterior", "interior"),
        };
        let mut out = format!("<gml:{outer}>{}</gml:{outer}>", self.ring(polygon.shell()));
        for hole in polygon.holes() {
            out.push_str(&format!("<gml:{inner}>{}</gml:{inner}>", self.ring(hole)));
        }
        out
    }

    /// Element name and content of a geometry.
    fn parts(&self, value: &GeometryValue) -> (&'static str, String) {
        let v3 = self.version == GmlVersion::V3;
        match value {
            GeometryValue::Point(point) => ("Point", self.point_body(point)),
            GeometryValue::LineString(ls) => ("LineString", self.coords(ls.coords())),
            GeometryValue::LinearRing(ring) => ("LinearRing", self.coords(ring.coords())),
            GeometryValue::Polygon(polygon) => ("Polygon", self.polygon_body(polygon)),
            GeometryValue::MultiPoint(points) => (
                "MultiPoint",
                self.members(
                    "pointMember",
                    points
                        .iter()
                        .map(|p| self.element(&GeometryValue::Point(*p))),
                ),
            ),
            GeometryValue::MultiLineString(lines) => (
                if v3 { "MultiCurve" } else { "MultiLineString" },
                self.members(
                    if v3 { "curveMember" } else { "lineStringMember" },
                    lines.iter().map(|ls| {
                        format!(
                            "<gml:LineString>{}</gml:LineString>",
                            self.coords(ls.coords())
                        )
                    }),
                ),
            ),
            GeometryValue::MultiPolygon(polygons) => (
                if v3 { "MultiSurface" } else { "MultiPolygon" },
                self.members(
                    if v3 { "surfaceMember" } else { "polygonMember" },
                    polygons.iter().map(|p| {
                        format!("<gml:Polygon>{}</gml:Polygon>", self.polygon_body(p))
                    }),
                ),
            ),
            GeometryValue::GeometryCollection(parts) => (
                "MultiGeometry",
                self.members(
                    "geometryMember",
                    parts.iter().map(|part| self.element(part.value())),
                ),
            ),
        }
    }

    fn members(&self, member: &str, elements: impl Iterator<Item = String>) -> String {
        elements
            .map(|element| format!("<gml:{member}>{element}</gml:{member}>"))
            .collect()
    }

    fn element(&self, value: &GeometryValue) -> String {
        let (name, body) = self.parts(value);
        format!("<gml:{name}>{body}</gml:{name}>")
    }

    /// The outermost element, which declares the namespace and carries the SRID.
    fn root(&self, value: &GeometryValue, srid: Option<i32>) -> String {
        let (name, body) = self.parts(value);
        let mut attributes = format!(r#" xmlns:gml="{GML_NAMESPACE}""#);
        if let Some(srid) = srid {
            let srs_name = match self.version {
                GmlVersion::V2 => format!("http://www.opengis.net/gml/srs/epsg.xml#{srid}"),
                GmlVersion::V3 => format!("EPSG:{srid}"),
            };
            attributes.push_str(&format!(r#" srsName="{srs_name}""#));
        }
        format!("<gml:{name}{attributes}>{body}</gml:{name}>")
    }
}

/// Encode a geometry as a GML geometry element in the given dialect.
///
/// The outermost element declares the `gml` namespace and, when the geometry has an SRID,
/// carries it as `srsName`.
pub fn write_gml(geom: &Geometry, version: GmlVersion, precision: Option<usize>) -> String {
    let writer = GmlWriter { version, precision };
    writer.root(geom.value(), geom.srid())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::io::gml::read_gml;
    use crate::test::{all_geometries, multilinestring, polygon};

    #[test]
    fn point_v3() {
        let geom = Geometry::point(30., 10.).with_srid(Some(4326));
        assert_eq!(
            write_gml(&geom, GmlVersion::V3, None),
            r#"<gml:Point xmlns:gml="http://www.opengis.net/gml" srsName="EPSG:4326"><gml:pos>30 10</gml:pos></gml:Point>"#
        );
    }

    #[test]
    fn point_v2() {
        let geom = Geometry::point(30., 10.);
        assert_eq!(
            write_gml(&geom, GmlVersion::V2, None),
            r#"<gml:Point xmlns:gml="http://www.opengis.net/gml"><gml:coordinates>30,10</gml:coordinates></gml:Point>"#
        );
    }

    #[test]
    fn dialect_element_names() {
        let v3 = write_gml(&multilinestring::mls0(), GmlVersion::V3, None);
        assert!(v3.contains("<gml:MultiCurve") && v3.contains("<gml:curveMember>"));
        let v2 = write_gml(&multilinestring::mls0(), GmlVersion::V2, None);
        assert!(v2.contains("<gml:MultiLineString") && v2.contains("<gml:lineStringMember>"));

        let v3 = write_gml(&polygon::p_with_hole().into(), GmlVersion::V3, None);
        assert!(v3.contains("<gml:exterior>") && v3.contains("<gml:interior>"));
        let v2 = write_gml(&polygon::p_with_hole().into(), GmlVersion::V2, None);
        assert!(v2.contains("<gml:outerBoundaryIs>") && v2.contains("<gml:innerBoundaryIs>"));
    }

    #[test]
    fn round_trip_both_dialects() {
        for version in [GmlVersion::V2, GmlVersion::V3] {
            for geom in all_geometries() {
                let text = write_gml(&geom, version, None);
                assert_eq!(read_gml(&text).unwrap(), geom, "{text}");
            }
            let geom = Geometry::from(polygon::p0()).with_srid(Some(27700));
            assert_eq!(read_gml(&write_gml(&geom, version, None)).unwrap(), geom);
        }
    }
}
