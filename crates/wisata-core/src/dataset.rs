use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::{Result, WisataError};

/// Tokens that mean "no value" once a text cell has been trimmed.
pub const MISSING_TOKENS: [&str; 5] = ["nan", "None", "", "N/A", "n/a"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Missing,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Missing, or text made only of whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Missing => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the cell; text is coerced, anything unparsable is `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => parse_number(s),
            Cell::Missing => None,
        }
    }

    /// Coerce to `Number`, turning unparsable values into `Missing`.
    pub fn to_numeric(&self) -> Cell {
        match self.as_number() {
            Some(n) => Cell::Number(n),
            None => Cell::Missing,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Python-style title casing: the first letter of every alphabetic run is
/// upper-cased, the rest lower-cased.
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_word = false;
    for ch in raw.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

/// Text-only table as produced by an extraction strategy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with empty cells; a row wider than
    /// the header is rejected.
    pub fn push_row(&mut self, mut row: Vec<String>) -> Result<()> {
        if row.len() > self.headers.len() {
            return Err(WisataError::Parse(format!(
                "{} columns passed, row has {} cells",
                self.headers.len(),
                row.len()
            )));
        }
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.headers.is_empty()
    }
}

/// Borrowed view of one record: column name to cell.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    cells: &'a [Cell],
}

impl<'a> Row<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.cells.get(idx))
    }

    pub fn text(&self, column: &str) -> Option<&'a str> {
        self.get(column).and_then(Cell::as_text)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Cell::as_number)
    }

    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }
}

/// Ordered records sharing a column set. Insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<Vec<Cell>>,
}

impl Dataset {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            records: Vec::new(),
        }
    }

    pub fn from_raw(raw: RawTable) -> Self {
        let mut dataset = Dataset::new(raw.headers);
        for row in raw.rows {
            dataset.push_record(row.into_iter().map(Cell::Text).collect());
        }
        dataset
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Append a record, padding with `Missing` or dropping surplus cells so it
    /// matches the column count.
    pub fn push_record(&mut self, mut cells: Vec<Cell>) {
        cells.resize(self.columns.len(), Cell::Missing);
        self.records.push(cells);
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.records.get(index).map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.records.iter().map(move |cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let col = self.column_index(column)?;
        self.records.get(row).and_then(|cells| cells.get(col))
    }

    pub fn set(&mut self, row: usize, column: &str, value: Cell) -> bool {
        match self.column_index(column) {
            Some(col) => match self.records.get_mut(row) {
                Some(cells) => {
                    cells[col] = value;
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// All cells of one column, in record order.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        self.column_index(name).and_then(|col| self.column_at(col))
    }

    /// Cells of the column at position `col`. Unlike [`Dataset::column`] this
    /// addresses each of several same-named columns separately.
    pub fn column_at(&self, col: usize) -> Option<impl Iterator<Item = &Cell> + '_> {
        (col < self.columns.len()).then(|| self.records.iter().map(move |cells| &cells[col]))
    }

    /// Add a column whose values are computed per row. Replaces the values if
    /// the column already exists.
    pub fn add_column_with<F>(&mut self, name: &str, mut value: F)
    where
        F: FnMut(Row<'_>) -> Cell,
    {
        let values: Vec<Cell> = self.rows().map(&mut value).collect();
        let col = match self.column_index(name) {
            Some(col) => col,
            None => {
                self.columns.push(name.to_string());
                for cells in &mut self.records {
                    cells.push(Cell::Missing);
                }
                self.columns.len() - 1
            }
        };
        for (cells, value) in self.records.iter_mut().zip(values) {
            cells[col] = value;
        }
    }

    /// Apply `f` to every cell of a column in place.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> bool
    where
        F: FnMut(&Cell) -> Cell,
    {
        let Some(col) = self.column_index(name) else {
            return false;
        };
        for cells in &mut self.records {
            cells[col] = f(&cells[col]);
        }
        true
    }

    pub fn map_cells<F>(&mut self, mut f: F)
    where
        F: FnMut(&Cell) -> Cell,
    {
        for cells in &mut self.records {
            for cell in cells.iter_mut() {
                *cell = f(cell);
            }
        }
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column_index(from) {
            Some(col) => {
                self.columns[col] = to.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_columns(&mut self, columns: Vec<String>) {
        debug_assert_eq!(columns.len(), self.columns.len());
        self.columns = columns;
    }

    pub fn retain_records<F>(&mut self, mut keep: F)
    where
        F: FnMut(Row<'_>) -> bool,
    {
        let columns = &self.columns;
        self.records.retain(|cells| keep(Row { columns, cells }));
    }

    /// Keep the columns whose index is flagged `true` in `keep`.
    pub fn retain_columns(&mut self, keep: &[bool]) {
        let mut flags = keep.iter();
        self.columns.retain(|_| *flags.next().unwrap_or(&true));
        for cells in &mut self.records {
            let mut flags = keep.iter();
            cells.retain(|_| *flags.next().unwrap_or(&true));
        }
    }

    /// Keep only the first `max_rows` records.
    pub fn truncate(&mut self, max_rows: usize) {
        self.records.truncate(max_rows);
    }

    pub fn count_filled(&self, column: &str) -> Option<usize> {
        self.column(column)
            .map(|cells| cells.filter(|c| !c.is_missing()).count())
    }
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.records.len()))?;
        for row in self.rows() {
            seq.serialize_element(&RowObject(row))?;
        }
        seq.end()
    }
}

struct RowObject<'a>(Row<'a>);

impl Serialize for RowObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.columns.len()))?;
        for (name, cell) in self.0.columns.iter().zip(self.0.cells) {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}

/// Maximum number of rows the caller keeps from a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCap(usize);

impl RowCap {
    pub const MIN: usize = 10;
    pub const MAX: usize = 3000;
    pub const DEFAULT: usize = 100;

    pub fn new(value: usize) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(WisataError::InvalidRowCap {
                value,
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }

    pub fn get(&self) -> usize {
        self.0
    }

    /// Trim `dataset` to the cap; returns how many rows were dropped.
    pub fn apply(&self, dataset: &mut Dataset) -> usize {
        let before = dataset.len();
        dataset.truncate(self.0);
        before - dataset.len()
    }
}

impl Default for RowCap {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}
