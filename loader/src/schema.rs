use crate::{
    flatten::{flat_keys, flatten, FlatKey},
    record::{Record, Scalar},
    table::Table,
};
use std::{collections::HashMap, fmt};
use thiserror::Error;
use tracing::trace;

pub const MISSING_MARKER: &str = "<NA>";

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("Record contains '{0}' which the seed record does not have")]
    UnexpectedKey(String),
    #[error("Record lacks '{0}' which the seed record has")]
    MissingKey(String),
}

/// value of a single (row, column) slot
/// `Missing` marks a field the record did not have and never equals a real value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Value(Scalar),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Missing => None,
            Self::Value(scalar) => Some(scalar),
        }
    }
}

impl PartialEq<Scalar> for Cell {
    fn eq(&self, other: &Scalar) -> bool {
        self.as_scalar() == Some(other)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str(MISSING_MARKER),
            Self::Value(scalar) => write!(f, "{scalar}"),
        }
    }
}

/// Column store built up during a single load.
/// Every key has exactly one slot per filled record, keys are kept in first-seen order.
/// A column is identified by its joined name, leaves of one record that join to the same
/// name (`{"a::b": 1, "a": {"b": 2}}`) share a column and the later leaf wins.
#[derive(Debug, Default)]
pub struct Schema {
    keys: Vec<FlatKey>,
    index: HashMap<String, usize>,
    columns: Vec<Vec<Cell>>,
    rows: usize,
}

impl Schema {
    /// derive the initial key set from the shape of a seed record
    pub fn seed(record: &Record) -> Self {
        let mut schema = Self::default();
        schema.union(record);

        schema
    }

    pub fn keys(&self) -> &[FlatKey] {
        &self.keys
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// add every flat key of `record` that is not known yet, returning how many were new
    /// rows filled before the key appeared get `Missing`
    pub fn union(&mut self, record: &Record) -> usize {
        let mut added = 0;

        for key in flat_keys(record) {
            if !self.index.contains_key(key.as_str()) {
                trace!(key = %key, "Discovered new column");
                self.index.insert(key.to_string(), self.keys.len());
                self.keys.push(key);
                self.columns.push(vec![Cell::Missing; self.rows]);
                added += 1;
            }
        }

        added
    }

    /// append one row, columns `record` has no leaf for get `Missing`
    pub fn fill_missing_values(&mut self, record: &Record) {
        let mut slots: Vec<Option<&Scalar>> = vec![None; self.keys.len()];

        for (key, scalar) in flatten(record) {
            if let Some(&position) = self.index.get(key.as_str()) {
                slots[position] = Some(scalar);
            }
        }

        for (column, slot) in self.columns.iter_mut().zip(slots) {
            column.push(slot.map_or(Cell::Missing, |scalar| Cell::Value(scalar.clone())));
        }
        self.rows += 1;
    }

    /// append one row assuming `record` has exactly the known key set
    pub fn fill(&mut self, record: &Record) -> Result<(), SchemaError> {
        let flat = flatten(record);
        let mut slots: Vec<Option<&Scalar>> = vec![None; self.keys.len()];

        for (key, scalar) in flat {
            match self.index.get(key.as_str()) {
                Some(&position) => slots[position] = Some(scalar),
                None => return Err(SchemaError::UnexpectedKey(key.to_string())),
            }
        }

        if let Some(position) = slots.iter().position(Option::is_none) {
            return Err(SchemaError::MissingKey(self.keys[position].to_string()));
        }

        for (column, scalar) in self.columns.iter_mut().zip(slots.into_iter().flatten()) {
            column.push(Cell::Value(scalar.clone()));
        }
        self.rows += 1;

        Ok(())
    }

    pub fn into_table(self) -> Table {
        Table::new(
            self.keys.iter().map(FlatKey::to_string).collect(),
            self.columns,
            self.rows,
        )
    }
}
