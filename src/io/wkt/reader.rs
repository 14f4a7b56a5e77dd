use phf::phf_map;

use crate::error::{GeodexError, Result};
use crate::geometry::{
    Coord, CoordSeq, Geometry, GeometryType, GeometryValue, LineString, LinearRing, Point, Polygon,
};
use crate::io::reject_at;

static GEOMETRY_TAGS: phf::Map<&'static str, GeometryType> = phf_map! {
    "POINT" => GeometryType::Point,
    "LINESTRING" => GeometryType::LineString,
    "LINEARRING" => GeometryType::LinearRing,
    "POLYGON" => GeometryType::Polygon,
    "MULTIPOINT" => GeometryType::MultiPoint,
    "MULTILINESTRING" => GeometryType::MultiLineString,
    "MULTIPOLYGON" => GeometryType::MultiPolygon,
    "GEOMETRYCOLLECTION" => GeometryType::GeometryCollection,
};

/// Deepest GEOMETRYCOLLECTION nesting accepted.
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Word(&'a str),
    Number(f64),
    LeftParen,
    RightParen,
    Comma,
    Eof,
}

impl Token<'_> {
    fn describe(&self) -> String {
        match self {
            Token::Word(word) => format!("'{word}'"),
            Token::Number(value) => format!("number {value}"),
            Token::LeftParen => "'('".to_string(),
            Token::RightParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

fn unexpected(offset: usize, token: Token, expected: &str) -> GeodexError {
    GeodexError::parse(
        offset,
        format!("expected {expected}, found {}", token.describe()),
    )
}

/// The value of a spelled-out `inf`, `infinity` or `nan`.
fn non_finite(word: &str) -> Option<f64> {
    if word.eq_ignore_ascii_case("inf") || word.eq_ignore_ascii_case("infinity") {
        Some(f64::INFINITY)
    } else if word.eq_ignore_ascii_case("nan") {
        Some(f64::NAN)
    } else {
        None
    }
}

/// Splits WKT into tokens, remembering the byte offset of each.
struct Tokens<'a> {
    input: &'a str,
    pos: usize,
    peeked: Option<(usize, Token<'a>)>,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str, pos: usize) -> Self {
        Self {
            input,
            pos,
            peeked: None,
        }
    }

    fn next(&mut self) -> Result<(usize, Token<'a>)> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.lex(),
        }
    }

    fn peek(&mut self) -> Result<(usize, Token<'a>)> {
        match self.peeked {
            Some(token) => Ok(token),
            None => {
                let token = self.lex()?;
                self.peeked = Some(token);
                Ok(token)
            }
        }
    }

    fn lex(&mut self) -> Result<(usize, Token<'a>)> {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        let start = self.pos;
        let Some(&c) = bytes.get(start) else {
            return Ok((start, Token::Eof));
        };

        let token = match c {
            b'(' => {
                self.pos += 1;
                Token::LeftParen
            }
            b')' => {
                self.pos += 1;
                Token::RightParen
            }
            b',' => {
                self.pos += 1;
                Token::Comma
            }
            b'+' | b'-' if bytes.get(start + 1).is_some_and(u8::is_ascii_alphabetic) => {
                self.pos += 1;
                while self.pos < bytes.len() && bytes[self.pos].is_ascii_alphabetic() {
                    self.pos += 1;
                }
                let magnitude = non_finite(&self.input[start + 1..self.pos]).ok_or_else(|| {
                    GeodexError::parse(
                        start,
                        format!("invalid number '{}'", &self.input[start..self.pos]),
                    )
                })?;
                Token::Number(if c == b'-' { -magnitude } else { magnitude })
            }
            b'0'..=b'9' | b'+' | b'-' | b'.' => {
                while self.pos < bytes.len()
                    && matches!(bytes[self.pos], b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E')
                {
                    self.pos += 1;
                }
                let text = &bytes[start..self.pos];
                let value = lexical_core::parse::<f64>(text).map_err(|_| {
                    GeodexError::parse(
                        start,
                        format!("invalid number '{}'", &self.input[start..self.pos]),
                    )
                })?;
                Token::Number(value)
            }
            c if c.is_ascii_alphabetic() => {
                while self.pos < bytes.len()
                    && (bytes[self.pos].is_ascii_alphanumeric() || bytes[self.pos] == b'_')
                {
                    self.pos += 1;
                }
                Token::Word(&self.input[start..self.pos])
            }
            _ => {
                let ch = self.input[start..].chars().next().unwrap_or_default();
                return Err(GeodexError::parse(
                    start,
                    format!("unexpected character '{ch}'"),
                ));
            }
        };
        Ok((start, token))
    }
}

struct Parser<'a> {
    tokens: Tokens<'a>,
}

impl<'a> Parser<'a> {
    fn expect_left(&mut self) -> Result<()> {
        match self.tokens.next()? {
            (_, Token::LeftParen) => Ok(()),
            (offset, token) => Err(unexpected(offset, token, "'('")),
        }
    }

    fn expect_right(&mut self) -> Result<()> {
        match self.tokens.next()? {
            (_, Token::RightParen) => Ok(()),
            (offset, token) => Err(unexpected(offset, token, "')'")),
        }
    }

    /// Consume the next token if it is the given keyword.
    fn keyword(&mut self, keyword: &str) -> Result<Option<usize>> {
        match self.tokens.peek()? {
            (offset, Token::Word(word)) if word.eq_ignore_ascii_case(keyword) => {
                self.tokens.next()?;
                Ok(Some(offset))
            }
            _ => Ok(None),
        }
    }

    fn number(&mut self) -> Result<f64> {
        match self.tokens.next()? {
            (_, Token::Number(value)) => Ok(value),
            (offset, Token::Word(word)) => {
                non_finite(word).ok_or_else(|| unexpected(offset, Token::Word(word), "a number"))
            }
            (offset, token) => Err(unexpected(offset, token, "a number")),
        }
    }

    /// `x y`, followed by any number of ordinates that are dropped.
    fn coord(&mut self) -> Result<Coord> {
        let x = self.number()?;
        let y = self.number()?;
        while let (_, Token::Number(_)) = self.tokens.peek()? {
            self.tokens.next()?;
        }
        Ok(Coord::new(x, y))
    }

    /// `( item, item, ... )` with at least one item.
    fn list<T>(&mut self, mut item: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        self.expect_left()?;
        let mut items = vec![item(self)?];
        loop {
            match self.tokens.next()? {
                (_, Token::Comma) => items.push(item(self)?),
                (_, Token::RightParen) => return Ok(items),
                (offset, token) => return Err(unexpected(offset, token, "',' or ')'")),
            }
        }
    }

    fn coord_seq(&mut self) -> Result<CoordSeq> {
        Ok(CoordSeq::from(self.list(Self::coord)?))
    }

    fn line_string(&mut self) -> Result<LineString> {
        let offset = self.tokens.peek()?.0;
        LineString::try_new(self.coord_seq()?).map_err(|e| reject_at(offset, e))
    }

    fn ring(&mut self) -> Result<LinearRing> {
        let offset = self.tokens.peek()?.0;
        LinearRing::try_new(self.coord_seq()?).map_err(|e| reject_at(offset, e))
    }

    fn polygon(&mut self) -> Result<Polygon> {
        let offset = self.tokens.peek()?.0;
        let mut rings = self.list(Self::ring)?.into_iter();
        let shell = rings
            .next()
            .ok_or_else(|| GeodexError::parse(offset, "polygon has no rings"))?;
        Ok(Polygon::new(shell, rings.collect()))
    }

    /// A MULTIPOINT member, with or without its own parentheses.
    fn multi_point_member(&mut self) -> Result<Point> {
        if let (_, Token::LeftParen) = self.tokens.peek()? {
            self.expect_left()?;
            let coord = self.coord()?;
            self.expect_right()?;
            Ok(coord.into())
        } else {
            Ok(self.coord()?.into())
        }
    }

    fn geometry(&mut self, depth: usize) -> Result<Geometry> {
        let (offset, token) = self.tokens.next()?;
        let Token::Word(tag) = token else {
            return Err(unexpected(offset, token, "a geometry type"));
        };
        let kind = *GEOMETRY_TAGS
            .get(tag.to_ascii_uppercase().as_str())
            .ok_or_else(|| GeodexError::parse(offset, format!("unknown geometry type '{tag}'")))?;
        if depth > MAX_DEPTH {
            return Err(GeodexError::parse(offset, "geometry nesting is too deep"));
        }

        for dimension in ["ZM", "Z", "M"] {
            if self.keyword(dimension)?.is_some() {
                break;
            }
        }

        if let Some(empty) = self.keyword("EMPTY")? {
            if !kind.is_collection() {
                return Err(GeodexError::parse(
                    empty,
                    format!("{} cannot be empty", kind.name()),
                ));
            }
            return Geometry::collection(kind, vec![]);
        }

        let value = match kind {
            GeometryType::Point => {
                self.expect_left()?;
                let coord = self.coord()?;
                self.expect_right()?;
                GeometryValue::Point(coord.into())
            }
            GeometryType::LineString => GeometryValue::LineString(self.line_string()?),
            GeometryType::LinearRing => GeometryValue::LinearRing(self.ring()?),
            GeometryType::Polygon => GeometryValue::Polygon(self.polygon()?),
            GeometryType::MultiPoint => {
                GeometryValue::MultiPoint(self.list(Self::multi_point_member)?)
            }
            GeometryType::MultiLineString => {
                GeometryValue::MultiLineString(self.list(Self::line_string)?)
            }
            GeometryType::MultiPolygon => GeometryValue::MultiPolygon(self.list(Self::polygon)?),
            GeometryType::GeometryCollection => GeometryValue::GeometryCollection(
                self.list(|parser| parser.geometry(depth + 1))?,
            ),
        };
        Ok(Geometry::new(value))
    }
}

/// Split off a leading `SRID=<n>;`, returning the SRID and the offset of the geometry text.
fn srid_prefix(text: &str) -> Result<(Option<i32>, usize)> {
    let trimmed = text.trim_start();
    let lead = text.len() - trimmed.len();
    match trimmed.get(..5) {
        Some(prefix) if prefix.eq_ignore_ascii_case("SRID=") => {}
        _ => return Ok((None, 0)),
    }

    let start = lead + 5;
    let end = text[start..]
        .find(';')
        .map(|i| start + i)
        .ok_or_else(|| GeodexError::parse(start, "expected ';' after SRID"))?;
    let srid = text[start..end]
        .trim()
        .parse::<i32>()
        .map_err(|_| GeodexError::parse(start, format!("invalid SRID '{}'", &text[start..end])))?;
    Ok((Some(srid), end + 1))
}

/// Decode WKT or EWKT.
///
/// Tags are case-insensitive, Z/M/ZM markers are accepted and the extra ordinates dropped.
/// Only the multi kinds and GEOMETRYCOLLECTION may be `EMPTY`.
///
/// # Errors
///
/// - [`GeodexError::Parse`] with the byte offset of the offending token
pub fn read_wkt(text: &str) -> Result<Geometry> {
    let (srid, start) = srid_prefix(text)?;
    let mut parser = Parser {
        tokens: Tokens::new(text, start),
    };
    let geom = parser.geometry(0)?;
    match parser.tokens.next()? {
        (_, Token::Eof) => Ok(geom.with_srid(srid)),
        (offset, token) => Err(GeodexError::parse(
            offset,
            format!("unexpected {} after geometry", token.describe()),
        )),
    }
}
