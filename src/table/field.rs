use indexmap::IndexMap;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::{GeodexError, Result};

/// The storage type of a user column, tagged by its ASCII type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum FieldType {
    /// Raw fixed-width bytes.
    Bytes = b'c',
    Int16 = b'h',
    Int32 = b'i',
    Int64 = b't',
    Float32 = b'f',
    Float64 = b'd',
    /// Fixed-width text, NUL padded.
    Text = b's',
    /// Variable length bytes stored outside the fixed row.
    Blob = b'b',
}

impl FieldType {
    pub fn tag(&self) -> char {
        char::from(u8::from(*self))
    }

    /// The required size of a numeric type.
    pub fn natural_size(&self) -> Option<usize> {
        match self {
            FieldType::Int16 => Some(2),
            FieldType::Int32 | FieldType::Float32 => Some(4),
            FieldType::Int64 | FieldType::Float64 => Some(8),
            FieldType::Bytes | FieldType::Text | FieldType::Blob => None,
        }
    }

    pub fn is_fixed_width(&self) -> bool {
        *self != FieldType::Blob
    }
}

impl TryFrom<char> for FieldType {
    type Error = GeodexError;

    fn try_from(tag: char) -> Result<Self> {
        u8::try_from(tag)
            .ok()
            .and_then(|byte| FieldType::try_from(byte).ok())
            .ok_or_else(|| GeodexError::invalid(format!("unknown field type '{tag}'")))
    }
}

/// A user column: a name, a type and, for fixed-width types, a size in bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub size: usize,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType, size: usize) -> Self {
        Self {
            name: name.into(),
            field_type,
            size,
        }
    }

    /// A field of a numeric type at its natural size, or a blob.
    pub fn of_type(name: impl Into<String>, field_type: FieldType) -> Self {
        Self::new(name, field_type, field_type.natural_size().unwrap_or(0))
    }

    fn check(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(GeodexError::invalid("field names must not be empty"));
        }
        match self.field_type.natural_size() {
            Some(size) if size != self.size => Err(GeodexError::invalid(format!(
                "field '{}' of type '{}' must have size {size}, got {}",
                self.name,
                self.field_type.tag(),
                self.size
            ))),
            None if self.field_type.is_fixed_width() && self.size == 0 => {
                Err(GeodexError::invalid(format!(
                    "field '{}' of type '{}' needs a positive size",
                    self.name,
                    self.field_type.tag()
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Whether columns 0 and 1 are reserved for the OID and the geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum TableFlag {
    /// Column 0 is the OID, column 1 the geometry; user fields start at column 2.
    #[default]
    ReserveColumns = 0,
    /// User fields start at column 0. Rows still carry a geometry, reachable through
    /// [`Row::geometry`](crate::table::Row::geometry).
    NoReservedColumns = 1,
}

impl TableFlag {
    /// The column number of the first user field.
    pub fn first_field_column(&self) -> usize {
        match self {
            TableFlag::ReserveColumns => 2,
            TableFlag::NoReservedColumns => 0,
        }
    }
}

/// Where a field's value lives inside a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    /// A byte range of the fixed row.
    Fixed { offset: usize, size: usize },
    /// An index into the row's blobs.
    Blob(usize),
}

/// What a column number refers to.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Column<'a> {
    Oid,
    Geometry,
    Field(&'a Field, Slot),
}

impl Column<'_> {
    /// The type code reported in mismatch errors; `o` and `g` for the reserved columns.
    pub fn tag(&self) -> char {
        match self {
            Column::Oid => 'o',
            Column::Geometry => 'g',
            Column::Field(field, _) => field.field_type.tag(),
        }
    }
}

/// The validated column layout of a table.
#[derive(Debug, Clone)]
pub(crate) struct Schema {
    fields: IndexMap<String, (Field, Slot)>,
    flag: TableFlag,
    row_size: usize,
    blob_count: usize,
}

impl Schema {
    pub fn try_new(fields: Vec<Field>, flag: TableFlag) -> Result<Self> {
        if fields.is_empty() {
            return Err(GeodexError::invalid("a table needs at least one field"));
        }

        let mut map = IndexMap::with_capacity(fields.len());
        let mut row_size = 0usize;
        let mut blob_count = 0;
        for field in fields {
            field.check()?;
            let slot = if field.field_type.is_fixed_width() {
                let slot = Slot::Fixed {
                    offset: row_size,
                    size: field.size,
                };
                row_size = row_size
                    .checked_add(field.size)
                    .ok_or_else(|| GeodexError::invalid("row size overflows"))?;
                slot
            } else {
                blob_count += 1;
                Slot::Blob(blob_count - 1)
            };
            if map.contains_key(&field.name) {
                return Err(GeodexError::invalid(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }
            map.insert(field.name.clone(), (field, slot));
        }

        Ok(Self {
            fields: map,
            flag,
            row_size,
            blob_count,
        })
    }

    pub fn flag(&self) -> TableFlag {
        self.flag
    }

    pub fn row_size(&self) -> usize {
        self.row_size
    }

    pub fn blob_count(&self) -> usize {
        self.blob_count
    }

    pub fn num_columns(&self) -> usize {
        self.flag.first_field_column() + self.fields.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values().map(|(field, _)| field)
    }

    pub fn column(&self, column: usize) -> Result<Column<'_>> {
        match (self.flag, column) {
            (TableFlag::ReserveColumns, 0) => return Ok(Column::Oid),
            (TableFlag::ReserveColumns, 1) => return Ok(Column::Geometry),
            _ => {}
        }
        column
            .checked_sub(self.flag.first_field_column())
            .and_then(|index| self.fields.get_index(index))
            .map(|(_, (field, slot))| Column::Field(field, *slot))
            .ok_or_else(|| {
                GeodexError::not_found(format!(
                    "column {column} (table has {} columns)",
                    self.num_columns()
                ))
            })
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields
            .get_index_of(name)
            .map(|index| index + self.flag.first_field_column())
    }
}
