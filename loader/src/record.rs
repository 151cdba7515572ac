use serde_json::{Number, Value};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Expected a JSON object but found {0}")]
    NotAnObject(&'static str),
    #[error("Expected a scalar but found an object")]
    NotAScalar,
}

/// leaf value of a benchmark result record
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// arrays are leaves, they are never descended into
    List(Vec<Value>),
}

impl Scalar {
    /// parse a user supplied value as JSON, falling back to a plain string
    pub fn parse(input: &str) -> Self {
        serde_json::from_str::<Value>(input)
            .ok()
            .and_then(|value| Self::try_from(value).ok())
            .unwrap_or_else(|| Self::String(input.to_owned()))
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(value) => Value::Bool(*value),
            Self::Number(number) => Value::Number(number.clone()),
            Self::String(string) => Value::String(string.clone()),
            Self::List(list) => Value::Array(list.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(number) => write!(f, "{number}"),
            Self::String(string) => f.write_str(string),
            Self::List(list) => f.write_str(&serde_json::to_string(list).map_err(|_| fmt::Error)?),
        }
    }
}

impl TryFrom<Value> for Scalar {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(value) => Ok(Self::Bool(value)),
            Value::Number(number) => Ok(Self::Number(number)),
            Value::String(string) => Ok(Self::String(string)),
            Value::Array(list) => Ok(Self::List(list)),
            Value::Object(_) => Err(RecordError::NotAScalar),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Leaf(Scalar),
    Node(Record),
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Node(Record {
                fields: map
                    .into_iter()
                    .map(|(key, value)| (key, Field::from(value)))
                    .collect(),
            }),
            Value::Null => Self::Leaf(Scalar::Null),
            Value::Bool(value) => Self::Leaf(Scalar::Bool(value)),
            Value::Number(number) => Self::Leaf(Scalar::Number(number)),
            Value::String(string) => Self::Leaf(Scalar::String(string)),
            Value::Array(list) => Self::Leaf(Scalar::List(list)),
        }
    }
}

/// One benchmark run: string keys mapped to leaves or nested records, in source order.
/// Keys are unique per level.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Field)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, field)| field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(key, field)| (key.as_str(), field))
    }

    /// insert a field, an existing field with the same key is replaced in place
    pub fn insert(&mut self, key: impl Into<String>, field: Field) -> Option<Field> {
        let key = key.into();

        match self.fields.iter_mut().find(|(name, _)| *name == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, field)),
            None => {
                self.fields.push((key, field));
                None
            }
        }
    }

    /// insert a field as the first top level field, removing any previous field with that key
    pub fn prepend(&mut self, key: impl Into<String>, field: Field) -> Option<Field> {
        let key = key.into();
        let previous = self
            .fields
            .iter()
            .position(|(name, _)| *name == key)
            .map(|position| self.fields.remove(position).1);

        self.fields.insert(0, (key, field));

        previous
    }

    /// follow a path of keys down to a leaf
    /// absent segments, leaves before the last segment and records at the end resolve to `None`
    pub fn resolve<S: AsRef<str>>(&self, path: &[S]) -> Option<&Scalar> {
        let (last, parents) = path.split_last()?;
        let mut scope = self;

        for segment in parents {
            match scope.get(segment.as_ref())? {
                Field::Node(record) => scope = record,
                Field::Leaf(_) => return None,
            }
        }

        match scope.get(last.as_ref())? {
            Field::Leaf(scalar) => Some(scalar),
            Field::Node(_) => None,
        }
    }
}

impl TryFrom<Value> for Record {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match Field::from(value) {
            Field::Node(record) => Ok(record),
            Field::Leaf(scalar) => Err(RecordError::NotAnObject(kind(&scalar))),
        }
    }
}

fn kind(scalar: &Scalar) -> &'static str {
    match scalar {
        Scalar::Null => "null",
        Scalar::Bool(_) => "a boolean",
        Scalar::Number(_) => "a number",
        Scalar::String(_) => "a string",
        Scalar::List(_) => "an array",
    }
}
