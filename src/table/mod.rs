//! An in-memory table of rows with typed cells and a geometry, indexed by geohash.
//!
//! ```
//! use geodex::geometry::Geometry;
//! use geodex::table::{Field, FieldType, Table, TableFlag};
//!
//! let mut table = Table::create(
//!     vec![Field::of_type("id", FieldType::Int64)],
//!     TableFlag::ReserveColumns,
//! )
//! .unwrap();
//! let oid = table.add_row().unwrap().oid();
//! table.set_row_byte_data(oid, 2, &42i64.to_le_bytes()).unwrap();
//! table.set_geometry(oid, Geometry::point(13.36, 38.11)).unwrap();
//! table.create_spr_index().unwrap();
//!
//! assert_eq!(table.read_cell_i64(oid, 2).unwrap(), 42);
//! assert_eq!(table.query_point(13.36, 38.11).unwrap(), vec![oid]);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use crate::algorithm::native::Envelope;
use crate::error::{GeodexError, Result};
use crate::geohash::{self, covering_cell_count, covering_cells, neighbors, GeohashBits};
use crate::geometry::{Coord, Geometry};
use crate::io::{self, Format, WriteOptions};

pub use config::TableConfig;
pub use field::{Field, FieldType, TableFlag};
pub use index::IndexBuildStats;
pub use row::{Oid, Row, RowMut};

mod config;
mod field;
mod index;
mod row;

use field::Schema;
use index::GeohashIndex;

/// Rows keyed by OID, with a fixed column layout and an optional geohash index.
///
/// Mutations after [`create_spr_index`](Self::create_spr_index) are not reflected in the
/// index; it is marked stale and queries log a warning until it is rebuilt.
#[derive(Debug, Clone)]
pub struct Table {
    schema: Schema,
    config: TableConfig,
    rows: BTreeMap<Oid, Row>,
    next_oid: Oid,
    cursor: Option<Oid>,
    index: Option<GeohashIndex>,
}

impl Table {
    /// Create an empty table with the default configuration.
    ///
    /// # Errors
    ///
    /// - [`GeodexError::InvalidArgument`] if `fields` is empty, has duplicate names, or a field
    ///   has an invalid size
    pub fn create(fields: Vec<Field>, flag: TableFlag) -> Result<Self> {
        Self::with_config(fields, flag, TableConfig::default())
    }

    /// Create an empty table.
    ///
    /// # Errors
    ///
    /// - [`GeodexError::InvalidArgument`] for an invalid schema or configuration
    pub fn with_config(fields: Vec<Field>, flag: TableFlag, config: TableConfig) -> Result<Self> {
        config.validate()?;
        let schema = Schema::try_new(fields, flag)?;
        tracing::debug!(
            columns = schema.num_columns(),
            row_size = schema.row_size(),
            ?flag,
            "created table"
        );
        Ok(Self {
            schema,
            config,
            rows: BTreeMap::new(),
            next_oid: 1,
            cursor: None,
            index: None,
        })
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn flag(&self) -> TableFlag {
        self.schema.flag()
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.schema.fields()
    }

    /// Size in bytes of the fixed-width part of every row.
    pub fn row_size(&self) -> usize {
        self.schema.row_size()
    }

    pub fn num_columns(&self) -> usize {
        self.schema.num_columns()
    }

    /// The column number of a user field.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.schema.field_index(name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, oid: Oid) -> bool {
        self.rows.contains_key(&oid)
    }

    /// All rows in OID order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.values()
    }

    fn mark_stale(&mut self) {
        if let Some(index) = self.index.as_mut() {
            index.mark_stale();
        }
    }

    /// Append a zeroed row. OIDs increase monotonically and are never reused, even after
    /// the row holding the largest OID is removed.
    ///
    /// # Errors
    ///
    /// - [`GeodexError::OutOfMemory`] if the row cannot be allocated
    /// - [`GeodexError::InvalidArgument`] if the OID space is exhausted
    pub fn add_row(&mut self) -> Result<RowMut<'_>> {
        let oid = self.next_oid;
        let next = oid
            .checked_add(1)
            .ok_or_else(|| GeodexError::invalid("OID space exhausted"))?;
        let row = Row::zeroed(oid, &self.schema)?;
        self.next_oid = next;
        self.mark_stale();
        tracing::trace!(oid, "added row");

        let row = self.rows.entry(oid).or_insert(row);
        Ok(RowMut {
            row,
            schema: &self.schema,
        })
    }

    pub fn get_row(&self, oid: Oid) -> Result<&Row> {
        self.rows
            .get(&oid)
            .ok_or_else(|| GeodexError::not_found(format!("row {oid}")))
    }

    /// Mutable access to a row.
    ///
    /// Any mutation through the handle marks the index stale.
    pub fn row_mut(&mut self, oid: Oid) -> Result<RowMut<'_>> {
        let row = self
            .rows
            .get_mut(&oid)
            .ok_or_else(|| GeodexError::not_found(format!("row {oid}")))?;
        if let Some(index) = self.index.as_mut() {
            index.mark_stale();
        }
        Ok(RowMut {
            row,
            schema: &self.schema,
        })
    }

    /// Overwrite a fixed-width cell; see [`RowMut::set_byte_data`].
    pub fn set_row_byte_data(&mut self, oid: Oid, column: usize, data: &[u8]) -> Result<()> {
        self.row_mut(oid)?.set_byte_data(column, data)
    }

    /// Replace a blob cell; see [`RowMut::set_blob_data`].
    pub fn set_row_blob_data(&mut self, oid: Oid, column: usize, blob: Vec<u8>) -> Result<()> {
        self.row_mut(oid)?.set_blob_data(column, blob)
    }

    /// Replace a row's geometry; see [`RowMut::set_geometry`].
    pub fn set_geometry(&mut self, oid: Oid, geometry: Geometry) -> Result<()> {
        self.row_mut(oid)?.set_geometry(geometry);
        Ok(())
    }

    /// Decode a geometry with the codec for `format` and store it in a row.
    pub fn set_geometry_from(&mut self, oid: Oid, data: &[u8], format: Format) -> Result<()> {
        let geometry = io::read(data, format)?;
        self.set_geometry(oid, geometry)
    }

    /// Encode a row's geometry with the codec for `format`.
    ///
    /// # Errors
    ///
    /// - [`GeodexError::NotFound`] if the row does not exist or has no geometry
    pub fn write_geometry(
        &self,
        oid: Oid,
        format: Format,
        options: &WriteOptions,
    ) -> Result<Vec<u8>> {
        let geometry = self
            .get_row(oid)?
            .geometry()
            .ok_or_else(|| GeodexError::not_found(format!("row {oid} has no geometry")))?;
        io::write(geometry, format, options)
    }

    /// Recompute a row's representative point; see [`RowMut::set_coordinate`].
    pub fn set_coordinate(&mut self, oid: Oid) -> Result<Option<Coord>> {
        self.row_mut(oid)?.set_coordinate()
    }

    /// Raw bytes of any fixed-width cell.
    pub fn read_cell_bytes(&self, oid: Oid, column: usize) -> Result<&[u8]> {
        Ok(self.get_row(oid)?.fixed(&self.schema, column)?.1)
    }

    pub fn read_cell_i16(&self, oid: Oid, column: usize) -> Result<i16> {
        self.get_row(oid)?.read_i16(&self.schema, column)
    }

    pub fn read_cell_i32(&self, oid: Oid, column: usize) -> Result<i32> {
        self.get_row(oid)?.read_i32(&self.schema, column)
    }

    pub fn read_cell_i64(&self, oid: Oid, column: usize) -> Result<i64> {
        self.get_row(oid)?.read_i64(&self.schema, column)
    }

    pub fn read_cell_f32(&self, oid: Oid, column: usize) -> Result<f32> {
        self.get_row(oid)?.read_f32(&self.schema, column)
    }

    pub fn read_cell_f64(&self, oid: Oid, column: usize) -> Result<f64> {
        self.get_row(oid)?.read_f64(&self.schema, column)
    }

    /// A text cell up to its first NUL.
    ///
    /// # Errors
    ///
    /// - [`GeodexError::Parse`] if the cell is not valid UTF-8
    pub fn read_cell_text(&self, oid: Oid, column: usize) -> Result<&str> {
        self.get_row(oid)?.read_text(&self.schema, column)
    }

    /// A blob cell; empty if never set.
    pub fn read_cell_blob(&self, oid: Oid, column: usize) -> Result<&[u8]> {
        self.get_row(oid)?.read_blob(&self.schema, column)
    }

    /// The OID column. Only tables created with [`TableFlag::ReserveColumns`] have one.
    pub fn read_cell_oid(&self, oid: Oid, column: usize) -> Result<Oid> {
        self.get_row(oid)?.read_oid(&self.schema, column)
    }

    /// The geometry column. Only tables created with [`TableFlag::ReserveColumns`] have one;
    /// use [`Row::geometry`] otherwise.
    pub fn read_cell_geometry(&self, oid: Oid, column: usize) -> Result<Option<&Geometry>> {
        self.get_row(oid)?.read_geometry(&self.schema, column)
    }

    /// Delete a row. Other rows keep their OIDs and the index is not updated.
    ///
    /// # Errors
    ///
    /// - [`GeodexError::NotFound`] if the row does not exist
    pub fn remove_row(&mut self, oid: Oid) -> Result<Row> {
        let row = self
            .rows
            .remove(&oid)
            .ok_or_else(|| GeodexError::not_found(format!("row {oid}")))?;
        self.mark_stale();
        tracing::trace!(oid, "removed row");
        Ok(row)
    }

    /// Delete every listed row that exists, returning how many were removed.
    pub fn remove_range(&mut self, oids: &[Oid]) -> usize {
        let removed = oids
            .iter()
            .filter(|oid| self.rows.remove(*oid).is_some())
            .count();
        if removed > 0 {
            self.mark_stale();
        }
        tracing::debug!(requested = oids.len(), removed, "removed rows");
        removed
    }

    /// Rewind the cursor to before the first row.
    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    /// Advance the cursor to the row with the next larger OID.
    ///
    /// Rows removed between calls are skipped; rows added between calls are visited once the
    /// cursor reaches their OID.
    pub fn table_next(&mut self) -> Option<&Row> {
        let lower = match self.cursor {
            Some(oid) => Bound::Excluded(oid),
            None => Bound::Unbounded,
        };
        let (oid, row) = self.rows.range((lower, Bound::Unbounded)).next()?;
        self.cursor = Some(*oid);
        Some(row)
    }

    /// Build the geohash index over every row with a geometry, replacing any previous index.
    ///
    /// Rows without a stored representative point have one computed first. Rows whose
    /// geometry is empty, or whose point lies outside the configured domain, are skipped.
    pub fn create_spr_index(&mut self) -> Result<IndexBuildStats> {
        let step = self.config.index_step;
        let (long_range, lat_range) = (self.config.longitude_range, self.config.latitude_range);
        let mut index = GeohashIndex::new(step);
        let mut stats = IndexBuildStats::default();

        for (oid, row) in self.rows.iter_mut() {
            stats.rows_scanned += 1;
            if row.geometry().is_none() {
                stats.rows_without_geometry += 1;
                continue;
            }
            let coordinate = match row.coordinate() {
                Some(coordinate) => Some(coordinate),
                None => RowMut {
                    row: &mut *row,
                    schema: &self.schema,
                }
                .set_coordinate()?,
            };
            let Some(coordinate) = coordinate else {
                tracing::trace!(oid, "skipping empty geometry");
                stats.rows_skipped += 1;
                continue;
            };

            match geohash::encode(long_range, lat_range, coordinate.x, coordinate.y, step) {
                Ok(cell) => {
                    tracing::trace!(oid, %cell, "indexed row");
                    index.insert(cell, *oid);
                    stats.rows_indexed += 1;
                }
                Err(GeodexError::OutOfRange { .. }) => {
                    tracing::warn!(
                        oid,
                        x = coordinate.x,
                        y = coordinate.y,
                        "representative point outside the index domain, row not indexed"
                    );
                    stats.rows_skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        stats.cells = index.num_cells() as u64;
        tracing::debug!(
            step,
            rows_indexed = stats.rows_indexed,
            rows_skipped = stats.rows_skipped,
            cells = stats.cells,
            "built geohash index"
        );
        self.index = Some(index);
        Ok(stats)
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    /// Whether the table changed since the index was built.
    pub fn is_index_stale(&self) -> bool {
        self.index.as_ref().is_some_and(GeohashIndex::is_stale)
    }

    fn index(&self) -> Result<&GeohashIndex> {
        let index = self
            .index
            .as_ref()
            .ok_or_else(|| GeodexError::not_found("no spatial index; call create_spr_index"))?;
        if index.is_stale() {
            tracing::warn!("querying a stale spatial index; rebuild it to see recent changes");
        }
        Ok(index)
    }

    /// OIDs of the live rows in the given cells, sorted and deduplicated.
    fn collect(
        &self,
        index: &GeohashIndex,
        cells: impl IntoIterator<Item = GeohashBits>,
    ) -> Vec<Oid> {
        let oids: BTreeSet<Oid> = cells
            .into_iter()
            .flat_map(|cell| index.members(cell))
            .filter(|oid| self.rows.contains_key(oid))
            .collect();
        oids.into_iter().collect()
    }

    /// Rows indexed in `cell` or any of its descendants.
    ///
    /// # Errors
    ///
    /// - [`GeodexError::NotFound`] if no index has been built
    pub fn query_cell(&self, cell: GeohashBits) -> Result<Vec<Oid>> {
        let index = self.index()?;
        Ok(self.collect(index, [cell]))
    }

    fn cell_at(&self, index: &GeohashIndex, x: f64, y: f64) -> Result<GeohashBits> {
        geohash::encode(
            self.config.longitude_range,
            self.config.latitude_range,
            x,
            y,
            index.step(),
        )
    }

    /// Rows indexed in the cell holding a position.
    ///
    /// # Errors
    ///
    /// - [`GeodexError::NotFound`] if no index has been built
    /// - [`GeodexError::OutOfRange`] if the position is outside the index domain
    pub fn query_point(&self, x: f64, y: f64) -> Result<Vec<Oid>> {
        let index = self.index()?;
        let cell = self.cell_at(index, x, y)?;
        Ok(self.collect(index, [cell]))
    }

    /// Rows indexed in the cell holding a position or any of its eight neighbours.
    pub fn query_neighborhood(&self, x: f64, y: f64) -> Result<Vec<Oid>> {
        let index = self.index()?;
        let cell = self.cell_at(index, x, y)?;
        let around = neighbors(cell)?;
        let cells = std::iter::once(cell).chain(around.iter().map(|(_, neighbor)| neighbor));
        Ok(self.collect(index, cells))
    }

    /// Rows whose representative point lies inside `envelope`.
    ///
    /// The envelope is covered by cells at the finest step that needs no more than
    /// `max_query_cells` cells, and the candidates are then filtered by their stored point.
    pub fn query_envelope(&self, envelope: &Envelope) -> Result<Vec<Oid>> {
        let index = self.index()?;
        let (long_range, lat_range) = (self.config.longitude_range, self.config.latitude_range);

        let mut step = index.step();
        while step > geohash::MIN_STEP
            && covering_cell_count(long_range, lat_range, envelope, step)?
                > self.config.max_query_cells as u64
        {
            step -= 1;
        }
        let cells = covering_cells(long_range, lat_range, envelope, step)?;
        tracing::trace!(step, cells = cells.len(), "envelope cover");

        let candidates = self.collect(index, cells);
        Ok(candidates
            .into_iter()
            .filter(|oid| {
                self.rows
                    .get(oid)
                    .and_then(Row::coordinate)
                    .is_some_and(|coordinate| envelope.contains(coordinate))
            })
            .collect())
    }
}
