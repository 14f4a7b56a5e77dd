use crate::error::{GeodexError, Result};
use crate::geometry::{
    Coord, CoordSeq, Geometry, GeometryType, GeometryValue, LineString, LinearRing, Point, Polygon,
};
use crate::io::xml::{parse_coordinate_tuples, parse_document, parse_position_list, Element};
use crate::io::{parse_srs_name, reject_at};

const GEOMETRY_ELEMENTS: [&str; 10] = [
    "Point",
    "LineString",
    "LinearRing",
    "Polygon",
    "MultiPoint",
    "MultiLineString",
    "MultiCurve",
    "MultiPolygon",
    "MultiSurface",
    "MultiGeometry",
];

/// Member elements holding exactly one geometry.
const MEMBER_ELEMENTS: [&str; 6] = [
    "pointMember",
    "lineStringMember",
    "curveMember",
    "polygonMember",
    "surfaceMember",
    "geometryMember",
];

/// Member elements holding any number of geometries.
const MEMBERS_ELEMENTS: [&str; 4] = [
    "pointMembers",
    "curveMembers",
    "surfaceMembers",
    "geometryMembers",
];

fn is_geometry(element: &Element) -> bool {
    GEOMETRY_ELEMENTS.contains(&element.name.as_str())
}

fn srs_dimension(element: &Element, inherited: usize) -> Result<usize> {
    match element.attribute("srsDimension") {
        Some(value) => value.trim().parse().map_err(|_| {
            GeodexError::parse(element.offset, format!("invalid srsDimension '{value}'"))
        }),
        None => Ok(inherited),
    }
}

/// The coordinates of a Point, LineString or LinearRing, in whichever encoding it uses.
fn coordinates(element: &Element, dims: usize) -> Result<CoordSeq> {
    let dims = srs_dimension(element, dims)?;
    if let Some(pos_list) = element.child("posList") {
        let dims = srs_dimension(pos_list, dims)?;
        return parse_position_list(&pos_list.text, dims, pos_list.offset);
    }
    if let Some(coordinates) = element.child("coordinates") {
        return parse_coordinate_tuples(&coordinates.text, coordinates.offset);
    }

    let mut coords = vec![];
    for child in &element.children {
        match child.name.as_str() {
            "pos" => {
                let dims = srs_dimension(child, dims)?;
                let pos = parse_position_list(&child.text, dims, child.offset)?;
                if pos.len() != 1 {
                    return Err(GeodexError::parse(
                        child.offset,
                        "<pos> must hold exactly one position",
                    ));
                }
                coords.push(pos.value(0));
            }
            // GML2 <coord><X/><Y/></coord>
            "coord" => {
                let axis = |name: &str| -> Result<f64> {
                    let value = child.child(name).ok_or_else(|| {
                        GeodexError::parse(child.offset, format!("<coord> has no <{name}>"))
                    })?;
                    lexical_core::parse::<f64>(value.text.trim().as_bytes()).map_err(|_| {
                        GeodexError::parse(
                            value.offset,
                            format!("invalid number '{}'", value.text.trim()),
                        )
                    })
                };
                coords.push(Coord::new(axis("X")?, axis("Y")?));
            }
            _ => {}
        }
    }
    if coords.is_empty() {
        return Err(GeodexError::parse(
            element.offset,
            format!("<{}> has no coordinates", element.name),
        ));
    }
    Ok(CoordSeq::from(coords))
}

fn ring(element: &Element, dims: usize) -> Result<LinearRing> {
    LinearRing::try_new(coordinates(element, dims)?).map_err(|e| reject_at(element.offset, e))
}

fn boundary_rings<'a>(
    polygon: &'a Element,
    boundaries: &'a [&'a str],
    dims: usize,
) -> impl Iterator<Item = Result<LinearRing>> + 'a {
    polygon
        .children
        .iter()
        .filter(move |child| boundaries.contains(&child.name.as_str()))
        .flat_map(|boundary| boundary.children_named("LinearRing"))
        .map(move |element| ring(element, dims))
}

fn polygon(element: &Element, dims: usize) -> Result<Polygon> {
    let dims = srs_dimension(element, dims)?;
    let shell = boundary_rings(element, &["exterior", "outerBoundaryIs"], dims)
        .next()
        .ok_or_else(|| GeodexError::parse(element.offset, "<Polygon> has no exterior ring"))??;
    let holes = boundary_rings(element, &["interior", "innerBoundaryIs"], dims)
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(shell, holes))
}

/// Every geometry held by the member elements of a collection.
fn members<'a>(element: &'a Element) -> impl Iterator<Item = &'a Element> + 'a {
    element.children.iter().flat_map(|child| {
        let name = child.name.as_str();
        let holds = MEMBER_ELEMENTS.contains(&name) || MEMBERS_ELEMENTS.contains(&name);
        child
            .children
            .iter()
            .filter(move |grandchild| holds && is_geometry(grandchild))
    })
}

fn collection_kind(name: &str) -> Option<GeometryType> {
    match name {
        "MultiPoint" => Some(GeometryType::MultiPoint),
        "MultiLineString" | "MultiCurve" => Some(GeometryType::MultiLineString),
        "MultiPolygon" | "MultiSurface" => Some(GeometryType::MultiPolygon),
        "MultiGeometry" => Some(GeometryType::GeometryCollection),
        _ => None,
    }
}

fn gml_geometry(element: &Element, dims: usize) -> Result<Geometry> {
    let dims = srs_dimension(element, dims)?;
    let value = match element.name.as_str() {
        "Point" => {
            let coords = coordinates(element, dims)?;
            if coords.len() != 1 {
                return Err(GeodexError::parse(
                    element.offset,
                    format!("<Point> needs one position, found {}", coords.len()),
                ));
            }
            GeometryValue::Point(Point::from(coords.value(0)))
        }
        "LineString" => GeometryValue::LineString(
            LineString::try_new(coordinates(element, dims)?)
                .map_err(|e| reject_at(element.offset, e))?,
        ),
        "LinearRing" => GeometryValue::LinearRing(ring(element, dims)?),
        "Polygon" => GeometryValue::Polygon(polygon(element, dims)?),
        name => {
            let kind = collection_kind(name).ok_or_else(|| {
                GeodexError::parse(element.offset, format!("<{name}> is not a GML geometry"))
            })?;
            let parts = members(element)
                .map(|member| gml_geometry(member, dims))
                .collect::<Result<Vec<_>>>()?;
            return Geometry::collection(kind, parts).map_err(|e| reject_at(element.offset, e));
        }
    };
    Ok(Geometry::new(value))
}

/// Decode the first GML geometry element of a fragment or full document. GML 2 and GML 3
/// encodings are both accepted, including `gml:MultiCurve` and `gml:MultiSurface`.
///
/// The `srsName` of the outermost geometry element sets the SRID when it names an EPSG code.
///
/// # Errors
///
/// - [`GeodexError::Parse`] for malformed XML, for input without a geometry element, and for
///   invalid coordinates or member kinds
pub fn read_gml(text: &str) -> Result<Geometry> {
    let root = parse_document(text)?;
    let element = root
        .find(&is_geometry)
        .ok_or_else(|| GeodexError::parse(0, "no GML geometry element found"))?;
    let srid = element.attribute("srsName").and_then(parse_srs_name);
    Ok(gml_geometry(element, 2)?.with_srid(srid))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test::{multipoint, polygon};

    #[test]
    fn gml3_pos_list_with_dimension() {
        let text = r#"<gml:LineString xmlns:gml="http://www.opengis.net/gml" srsDimension="3">
            <gml:posList>0 1 5 1 2 5</gml:posList>
        </gml:LineString>"#;
        assert_eq!(
            read_gml(text).unwrap(),
            Geometry::line_string(vec![(0., 1.), (1., 2.)]).unwrap()
        );
    }

    #[test]
    fn gml2_polygon() {
        let text = r#"<gml:Polygon xmlns:gml="http://www.opengis.net/gml"
                srsName="http://www.opengis.net/gml/srs/epsg.xml#4326">
            <gml:outerBoundaryIs><gml:LinearRing>
              <gml:coordinates>35,10 45,45 15,40 10,20 35,10</gml:coordinates>
            </gml:LinearRing></gml:outerBoundaryIs>
            <gml:innerBoundaryIs><gml:LinearRing>
              <gml:coordinates>20,30 35,35 30,20 20,30</gml:coordinates>
            </gml:LinearRing></gml:innerBoundaryIs>
        </gml:Polygon>"#;
        assert_eq!(
            read_gml(text).unwrap(),
            Geometry::from(polygon::p_with_hole()).with_srid(Some(4326))
        );
    }

    #[test]
    fn gml2_coord_elements() {
        let text = "<Point><coord><X>30</X><Y>10</Y></coord></Point>";
        assert_eq!(read_gml(text).unwrap(), Geometry::point(30., 10.));
    }

    #[test]
    fn urn_srs_name() {
        let text = r#"<Point srsName="urn:ogc:def:crs:EPSG::3857"><pos>1 2</pos></Point>"#;
        assert_eq!(read_gml(text).unwrap().srid(), Some(3857));
    }

    #[test]
    fn plural_members() {
        let text = "<MultiPoint><pointMembers>\
            <Point><pos>10 40</pos></Point><Point><pos>40 30</pos></Point>\
            </pointMembers></MultiPoint>";
        assert_eq!(read_gml(text).unwrap(), multipoint::mp0());
    }

    #[test]
    fn errors() {
        for text in [
            "<FeatureCollection/>",
            "<Point/>",
            "<Point><pos>1 2 3</pos></Point>",
            "<Point><posList>1 2 3 4</posList></Point>",
            "<LineString><posList>1 2</posList></LineString>",
            "<Polygon></Polygon>",
            "<LineString srsDimension=\"x\"><posList>1 2 3 4</posList></LineString>",
            "<MultiPoint><pointMember><LineString><posList>0 0 1 1</posList></LineString>\
             </pointMember></MultiPoint>",
        ] {
            assert_eq!(
                read_gml(text).unwrap_err().kind(),
                ErrorKind::ParseError,
                "{text}"
            );
        }
    }
}
