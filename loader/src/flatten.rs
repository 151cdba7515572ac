use crate::record::{Field, Record, Scalar};
use std::fmt;

pub const KEY_SEPARATOR: &str = "::";

/// path from the record root to a leaf, e.g. `config::access_range`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlatKey {
    segments: Vec<String>,
    joined: String,
}

impl FlatKey {
    pub fn new<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        let joined = segments.join(KEY_SEPARATOR);

        Self { segments, joined }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.joined
    }
}

impl AsRef<str> for FlatKey {
    fn as_ref(&self) -> &str {
        &self.joined
    }
}

impl fmt::Display for FlatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined)
    }
}

/// flatten a record into `(flat key, leaf)` pairs in depth first source order
pub fn flatten(record: &Record) -> Vec<(FlatKey, &Scalar)> {
    let mut flat = Vec::new();
    walk(record, &mut Vec::new(), &mut flat);

    flat
}

/// only the shape of a record
pub fn flat_keys(record: &Record) -> Vec<FlatKey> {
    flatten(record).into_iter().map(|(key, _)| key).collect()
}

fn walk<'a>(record: &'a Record, prefix: &mut Vec<String>, flat: &mut Vec<(FlatKey, &'a Scalar)>) {
    for (key, field) in record.iter() {
        prefix.push(key.to_owned());

        match field {
            Field::Node(nested) => walk(nested, prefix, flat),
            Field::Leaf(scalar) => flat.push((FlatKey::new(prefix.iter().cloned()), scalar)),
        }

        prefix.pop();
    }
}
