use crate::{record::Scalar, schema::Cell};
use std::{cmp::Ordering, collections::HashMap};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("Column '{0}' does not exist")]
    UnknownColumn(String),
}

/// Uniform result table, row `i` is the `i`-th loaded record.
/// Cells are stored column major, every column holds exactly `len()` cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    data: Vec<Vec<Cell>>,
    rows: usize,
}

impl Table {
    pub(crate) fn new(columns: Vec<String>, data: Vec<Vec<Cell>>, rows: usize) -> Self {
        debug_assert_eq!(columns.len(), data.len());
        debug_assert!(data.iter().all(|column| column.len() == rows));

        let mut index = HashMap::with_capacity(columns.len());
        for (position, name) in columns.iter().enumerate() {
            index.entry(name.clone()).or_insert(position);
        }

        Self {
            columns,
            index,
            data,
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// number of rows
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.index
            .get(name)
            .map(|&position| self.data[position].as_slice())
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.rows).then_some(Row { table: self, index })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.rows).map(move |index| Row { table: self, index })
    }

    /// distinct cells of a column in first seen order
    pub fn unique(&self, name: &str) -> Result<Vec<&Cell>, TableError> {
        let column = self
            .column(name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_owned()))?;
        let mut unique: Vec<&Cell> = Vec::new();

        for cell in column {
            if !unique.contains(&cell) {
                unique.push(cell);
            }
        }

        Ok(unique)
    }

    /// keep the rows matching `predicate`, columns stay the same
    pub fn filter<P>(&self, mut predicate: P) -> Table
    where
        P: FnMut(&Row<'_>) -> bool,
    {
        let kept: Vec<usize> = self
            .rows()
            .filter(|row| predicate(row))
            .map(|row| row.index)
            .collect();

        self.take(&kept)
    }

    /// rows where `name` holds exactly `value`, an unknown column matches nothing
    pub fn filter_eq(&self, name: &str, value: &Scalar) -> Table {
        self.filter(|row| row.get(name).map_or(false, |cell| cell == value))
    }

    /// project onto a subset of columns in the given order
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Table, TableError> {
        let mut columns = Vec::with_capacity(names.len());
        let mut data = Vec::with_capacity(names.len());

        for name in names {
            let name = name.as_ref();
            let column = self
                .column(name)
                .ok_or_else(|| TableError::UnknownColumn(name.to_owned()))?;

            columns.push(name.to_owned());
            data.push(column.to_vec());
        }

        Ok(Table::new(columns, data, self.rows))
    }

    /// Stable sort by the given columns, first column most significant.
    /// `Missing` sorts after every value.
    pub fn sort_by<S: AsRef<str>>(&self, names: &[S]) -> Result<Table, TableError> {
        let keys = self.key_columns(names)?;
        let mut order: Vec<usize> = (0..self.rows).collect();

        order.sort_by(|&left, &right| {
            keys.iter()
                .map(|column| compare_cells(&column[left], &column[right]))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });

        Ok(self.take(&order))
    }

    /// Split into one table per distinct combination of the given columns.
    /// Groups keep first seen order and `Missing` forms a group of its own.
    pub fn group_by<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Vec<(Vec<&Cell>, Table)>, TableError> {
        let keys = self.key_columns(names)?;
        let mut groups: Vec<(Vec<&Cell>, Vec<usize>)> = Vec::new();

        for row in 0..self.rows {
            let key: Vec<&Cell> = keys.iter().map(|&column| &column[row]).collect();

            match groups.iter().position(|(existing, _)| *existing == key) {
                Some(position) => groups[position].1.push(row),
                None => groups.push((key, vec![row])),
            }
        }

        Ok(groups
            .into_iter()
            .map(|(key, rows)| (key, self.take(&rows)))
            .collect())
    }

    fn key_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&[Cell]>, TableError> {
        names
            .iter()
            .map(|name| {
                self.column(name.as_ref())
                    .ok_or_else(|| TableError::UnknownColumn(name.as_ref().to_owned()))
            })
            .collect()
    }

    /// new table holding the given rows in the given order
    fn take(&self, rows: &[usize]) -> Table {
        let data = self
            .data
            .iter()
            .map(|column| rows.iter().map(|&row| column[row].clone()).collect())
            .collect();

        Table::new(self.columns.clone(), data, rows.len())
    }
}

fn compare_cells(left: &Cell, right: &Cell) -> Ordering {
    match (left.as_scalar(), right.as_scalar()) {
        (Some(left), Some(right)) => compare_scalars(left, right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// values of different kinds order by kind: null, bool, number, string, list
fn compare_scalars(left: &Scalar, right: &Scalar) -> Ordering {
    match (left, right) {
        (Scalar::Bool(left), Scalar::Bool(right)) => left.cmp(right),
        (Scalar::Number(left), Scalar::Number(right)) => {
            match (left.as_i64(), right.as_i64(), left.as_u64(), right.as_u64()) {
                (Some(left), Some(right), _, _) => left.cmp(&right),
                (_, _, Some(left), Some(right)) => left.cmp(&right),
                _ => left
                    .as_f64()
                    .partial_cmp(&right.as_f64())
                    .unwrap_or(Ordering::Equal),
            }
        }
        (Scalar::String(left), Scalar::String(right)) => left.cmp(right),
        (Scalar::List(_), Scalar::List(_)) => left.to_string().cmp(&right.to_string()),
        _ => rank(left).cmp(&rank(right)),
    }
}

fn rank(scalar: &Scalar) -> u8 {
    match scalar {
        Scalar::Null => 0,
        Scalar::Bool(_) => 1,
        Scalar::Number(_) => 2,
        Scalar::String(_) => 3,
        Scalar::List(_) => 4,
    }
}

/// borrowed view of one table row
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, name: &str) -> Option<&'a Cell> {
        self.table.column(name).map(|column| &column[self.index])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Cell)> + 'a {
        let table = self.table;
        let index = self.index;

        table
            .columns
            .iter()
            .zip(table.data.iter())
            .map(move |(name, column)| (name.as_str(), &column[index]))
    }
}
