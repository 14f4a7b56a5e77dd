use byteorder::{ByteOrder, LittleEndian};

use crate::algorithm::native::BoundingRect;
use crate::error::{GeodexError, Result};
use crate::geometry::{Coord, Geometry};
use crate::table::field::{Column, FieldType, Schema, Slot};

/// Object identifier of a row.
pub type Oid = u64;

/// One table row: fixed-width cells, blobs, the geometry and its representative point.
///
/// Numeric cells are stored little-endian.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    oid: Oid,
    data: Vec<u8>,
    blobs: Vec<Vec<u8>>,
    geometry: Option<Geometry>,
    coordinate: Option<Coord>,
}

fn mismatch(column: usize, expected: &'static str, found: &Column) -> GeodexError {
    GeodexError::ColumnTypeMismatch {
        column,
        expected: expected.into(),
        found: found.tag(),
    }
}

impl Row {
    pub(crate) fn zeroed(oid: Oid, schema: &Schema) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(schema.row_size())?;
        data.resize(schema.row_size(), 0);
        Ok(Self {
            oid,
            data,
            blobs: vec![Vec::new(); schema.blob_count()],
            geometry: None,
            coordinate: None,
        })
    }

    pub fn oid(&self) -> Oid {
        self.oid
    }

    /// The fixed-width cells, concatenated in field order.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    /// The stored representative point, if one has been computed since the geometry was last
    /// set.
    pub fn coordinate(&self) -> Option<Coord> {
        self.coordinate
    }

    /// The bytes of a fixed-width cell.
    pub(crate) fn fixed(&self, schema: &Schema, column: usize) -> Result<(FieldType, &[u8])> {
        match schema.column(column)? {
            Column::Field(field, Slot::Fixed { offset, size }) => {
                Ok((field.field_type, &self.data[offset..offset + size]))
            }
            other => Err(mismatch(column, "a fixed-width column", &other)),
        }
    }

    fn typed(&self, schema: &Schema, column: usize, field_type: FieldType) -> Result<&[u8]> {
        let (found, bytes) = self.fixed(schema, column)?;
        if found != field_type {
            return Err(GeodexError::ColumnTypeMismatch {
                column,
                expected: format!("'{}'", field_type.tag()).into(),
                found: found.tag(),
            });
        }
        Ok(bytes)
    }

    pub(crate) fn read_i16(&self, schema: &Schema, column: usize) -> Result<i16> {
        Ok(LittleEndian::read_i16(self.typed(schema, column, FieldType::Int16)?))
    }

    pub(crate) fn read_i32(&self, schema: &Schema, column: usize) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.typed(schema, column, FieldType::Int32)?))
    }

    pub(crate) fn read_i64(&self, schema: &Schema, column: usize) -> Result<i64> {
        Ok(LittleEndian::read_i64(self.typed(schema, column, FieldType::Int64)?))
    }

    pub(crate) fn read_f32(&self, schema: &Schema, column: usize) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.typed(schema, column, FieldType::Float32)?))
    }

    pub(crate) fn read_f64(&self, schema: &Schema, column: usize) -> Result<f64> {
        Ok(LittleEndian::read_f64(self.typed(schema, column, FieldType::Float64)?))
    }

    /// A text cell up to its first NUL.
    pub(crate) fn read_text(&self, schema: &Schema, column: usize) -> Result<&str> {
        let bytes = self.typed(schema, column, FieldType::Text)?;
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
        std::str::from_utf8(&bytes[..end])
            .map_err(|e| GeodexError::parse(e.valid_up_to(), "text cell is not valid UTF-8"))
    }

    pub(crate) fn read_blob(&self, schema: &Schema, column: usize) -> Result<&[u8]> {
        match schema.column(column)? {
            Column::Field(_, Slot::Blob(index)) => Ok(&self.blobs[index]),
            other => Err(mismatch(column, "a blob column", &other)),
        }
    }

    pub(crate) fn read_oid(&self, schema: &Schema, column: usize) -> Result<Oid> {
        match schema.column(column)? {
            Column::Oid => Ok(self.oid),
            other => Err(mismatch(column, "the OID column", &other)),
        }
    }

    pub(crate) fn read_geometry(&self, schema: &Schema, column: usize) -> Result<Option<&Geometry>> {
        match schema.column(column)? {
            Column::Geometry => Ok(self.geometry.as_ref()),
            other => Err(mismatch(column, "the geometry column", &other)),
        }
    }
}

/// Mutable access to a single row.
#[derive(Debug)]
pub struct RowMut<'a> {
    pub(crate) row: &'a mut Row,
    pub(crate) schema: &'a Schema,
}

impl RowMut<'_> {
    pub fn oid(&self) -> Oid {
        self.row.oid
    }

    /// Overwrite a fixed-width cell. Shorter data is zero padded.
    ///
    /// # Errors
    ///
    /// - [`GeodexError::ColumnTypeMismatch`] if the column is a blob or a reserved column
    /// - [`GeodexError::InvalidArgument`] if `data` is longer than the field
    /// - [`GeodexError::NotFound`] if the column does not exist
    pub fn set_byte_data(&mut self, column: usize, data: &[u8]) -> Result<()> {
        let (offset, size) = match self.schema.column(column)? {
            Column::Field(_, Slot::Fixed { offset, size }) => (offset, size),
            other => return Err(mismatch(column, "a fixed-width column", &other)),
        };
        if data.len() > size {
            return Err(GeodexError::invalid(format!(
                "{} bytes do not fit in column {column} of {size} bytes",
                data.len()
            )));
        }
        let cell = &mut self.row.data[offset..offset + size];
        cell[..data.len()].copy_from_slice(data);
        cell[data.len()..].fill(0);
        Ok(())
    }

    /// Replace a blob cell.
    ///
    /// # Errors
    ///
    /// - [`GeodexError::ColumnTypeMismatch`] if the column is not a blob
    /// - [`GeodexError::NotFound`] if the column does not exist
    pub fn set_blob_data(&mut self, column: usize, blob: Vec<u8>) -> Result<()> {
        match self.schema.column(column)? {
            Column::Field(_, Slot::Blob(index)) => {
                self.row.blobs[index] = blob;
                Ok(())
            }
            other => Err(mismatch(column, "a blob column", &other)),
        }
    }

    /// Replace the geometry. The stored representative point is cleared until
    /// [`set_coordinate`](Self::set_coordinate) or an index build recomputes it.
    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.row.geometry = Some(geometry);
        self.row.coordinate = None;
    }

    /// Recompute and store the representative point of the geometry. Empty geometries have
    /// none.
    ///
    /// # Errors
    ///
    /// - [`GeodexError::NotFound`] if the row has no geometry
    pub fn set_coordinate(&mut self) -> Result<Option<Coord>> {
        let geometry = self.row.geometry.as_ref().ok_or_else(|| {
            GeodexError::not_found(format!("row {} has no geometry", self.row.oid))
        })?;
        self.row.coordinate = geometry.representative_point();
        Ok(self.row.coordinate)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::table::field::{Field, TableFlag};

    fn schema() -> Schema {
        Schema::try_new(
            vec![
                Field::new("code", FieldType::Bytes, 4),
                Field::new("label", FieldType::Text, 8),
                Field::of_type("depth", FieldType::Float32),
                Field::of_type("notes", FieldType::Blob),
            ],
            TableFlag::ReserveColumns,
        )
        .unwrap()
    }

    #[test]
    fn zero_padded_cells() {
        let schema = schema();
        let mut row = Row::zeroed(7, &schema).unwrap();
        assert_eq!(row.data(), &[0; 16]);

        let mut row_mut = RowMut {
            row: &mut row,
            schema: &schema,
        };
        row_mut.set_byte_data(2, b"quay").unwrap();
        row_mut.set_byte_data(2, b"ab").unwrap();
        row_mut.set_byte_data(3, b"pier").unwrap();
        row_mut.set_byte_data(4, &(-2.5f32).to_le_bytes()).unwrap();
        row_mut.set_blob_data(5, vec![1, 2, 3]).unwrap();

        assert_eq!(row.fixed(&schema, 2).unwrap().1, b"ab\0\0");
        assert_eq!(row.read_text(&schema, 3).unwrap(), "pier");
        assert_eq!(row.read_f32(&schema, 4).unwrap(), -2.5);
        assert_eq!(row.read_blob(&schema, 5).unwrap(), &[1, 2, 3]);
        assert_eq!(row.read_oid(&schema, 0).unwrap(), 7);
    }

    #[test]
    fn type_mismatches() {
        let schema = schema();
        let mut row = Row::zeroed(1, &schema).unwrap();
        let mut row_mut = RowMut {
            row: &mut row,
            schema: &schema,
        };
        let kind = |r: Result<()>| r.unwrap_err().kind();
        assert_eq!(kind(row_mut.set_byte_data(5, b"x")), ErrorKind::ColumnTypeMismatch);
        assert_eq!(kind(row_mut.set_blob_data(2, vec![])), ErrorKind::ColumnTypeMismatch);
        assert_eq!(kind(row_mut.set_byte_data(0, b"x")), ErrorKind::ColumnTypeMismatch);
        assert_eq!(kind(row_mut.set_byte_data(2, b"toolong")), ErrorKind::InvalidArgument);
        assert_eq!(kind(row_mut.set_byte_data(9, b"x")), ErrorKind::NotFound);

        assert_eq!(
            row.read_i64(&schema, 4).unwrap_err().kind(),
            ErrorKind::ColumnTypeMismatch
        );
        assert!(matches!(
            row.read_geometry(&schema, 0).unwrap_err(),
            GeodexError::ColumnTypeMismatch { found: 'o', .. }
        ));
    }

    #[test]
    fn invalid_text() {
        let schema = schema();
        let mut row = Row::zeroed(1, &schema).unwrap();
        RowMut {
            row: &mut row,
            schema: &schema,
        }
        .set_byte_data(3, &[b'o', b'k', 0xFF])
        .unwrap();
        assert_eq!(
            row.read_text(&schema, 3).unwrap_err().kind(),
            ErrorKind::ParseError
        );
    }

    #[test]
    fn coordinate_follows_geometry() {
        let schema = schema();
        let mut row = Row::zeroed(1, &schema).unwrap();
        let mut row_mut = RowMut {
            row: &mut row,
            schema: &schema,
        };
        assert_eq!(row_mut.set_coordinate().unwrap_err().kind(), ErrorKind::NotFound);

        row_mut.set_geometry(Geometry::line_string(vec![(0., 0.), (4., 2.)]).unwrap());
        assert_eq!(row_mut.set_coordinate().unwrap(), Some(Coord::new(2., 1.)));
        row_mut.set_geometry(Geometry::point(5., 5.));
        assert_eq!(row.coordinate(), None);
    }
}
