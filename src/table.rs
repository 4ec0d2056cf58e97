//! Tables: a schema plus a sorted primary-key index of records.

use crate::error::{DbError, DbResult};
use crate::record::Record;
use crate::schema::Schema;
use crate::value::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// The values of a record's primary-key attributes, in key order. Ordered
/// lexicographically under `Value::total_order`; it is the application's
/// responsibility to keep keys homogeneous per attribute.
#[derive(Debug, Clone)]
pub struct KeyTuple(Vec<Value>);

impl KeyTuple {
    pub fn new(values: Vec<Value>) -> Self {
        KeyTuple(values)
    }
}

impl PartialEq for KeyTuple {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for KeyTuple {}

impl PartialOrd for KeyTuple {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KeyTuple {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            match a.total_order(b) {
                Ordering::Equal => continue,
                order => return order,
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

impl fmt::Display for KeyTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "]")
    }
}

/// A collection of records sharing one schema, indexed by key-tuple.
#[derive(Debug, Clone)]
pub struct Table {
    schema: Arc<Schema>,
    records: BTreeMap<KeyTuple, Record>,
}

impl Table {
    pub fn new(schema: Schema) -> Self {
        Table {
            schema: Arc::new(schema),
            records: BTreeMap::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Replaces the schema. Used by the schema builder before any records
    /// exist; schemas are frozen once records are created against them.
    pub(crate) fn set_schema(&mut self, schema: Schema) {
        debug_assert!(self.records.is_empty());
        self.schema = Arc::new(schema);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Constructs a record from the given values and inserts it under its
    /// key-tuple. Fails when the key is already present.
    pub fn insert_record(&mut self, values: Vec<Value>) -> DbResult<Record> {
        let record = Record::new(self.schema.clone(), values)?;
        let key = self.key_of(&record);
        if self.records.contains_key(&key) {
            return Err(DbError::DuplicateKey {
                key: key.to_string(),
            });
        }
        self.records.insert(key, record.clone());
        Ok(record)
    }

    /// Looks up a record by its key values.
    pub fn find(&self, key: Vec<Value>) -> Option<&Record> {
        self.records.get(&KeyTuple::new(key))
    }

    /// All records, in key order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// The records of this table that agree with `record` on every common
    /// attribute. When the common attributes cover this table's entire key,
    /// a single key lookup suffices (followed by verification of the
    /// remaining common attributes); otherwise the whole table is scanned.
    pub fn matching_records(&self, record: &Record, common_attributes: &[String]) -> Vec<&Record> {
        let key_covered = self
            .schema
            .key_names()
            .iter()
            .all(|k| common_attributes.contains(k));
        if key_covered {
            let key = self.key_of(record);
            return match self.records.get(&key) {
                Some(found) if matching(record, found, common_attributes) => vec![found],
                _ => vec![],
            };
        }
        self.records
            .values()
            .filter(|candidate| matching(record, candidate, common_attributes))
            .collect()
    }

    /// The key-tuple of a record under this table's key attributes.
    fn key_of(&self, record: &Record) -> KeyTuple {
        KeyTuple::new(record.values_of(self.schema.key_names()))
    }
}

/// True when the two records hold equal values for every common attribute.
fn matching(r1: &Record, r2: &Record, common_attributes: &[String]) -> bool {
    common_attributes
        .iter()
        .all(|name| r1.get(name) == r2.get(name))
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.schema, self.records.len())
    }
}
