//! Records: fixed-length value tuples anchored to a schema.

use crate::error::{DbError, DbResult};
use crate::schema::Schema;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// A record holds one value per attribute of its schema, in positional
/// order. Records are immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl Record {
    /// Constructs a record. The number of values must match the schema size.
    pub fn new(schema: Arc<Schema>, values: Vec<Value>) -> DbResult<Record> {
        if values.len() != schema.size() {
            return Err(DbError::ArityMismatch {
                expected: schema.size(),
                actual: values.len(),
            });
        }
        Ok(Record { schema, values })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The value at a positional index.
    pub fn value(&self, index: usize) -> &Value {
        &self.values[index]
    }

    /// The value of a named attribute, if the schema has it.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema.index_of(name).map(|i| &self.values[i])
    }

    /// The values of the named attributes, in the given order. Names absent
    /// from the schema are skipped.
    pub fn values_of(&self, names: &[String]) -> Vec<Value> {
        names
            .iter()
            .filter_map(|n| self.get(n))
            .cloned()
            .collect()
    }

    /// Concatenates two records under a join output schema: for each output
    /// attribute, the left record's value when its schema holds the
    /// attribute, otherwise the right's.
    pub fn concatenate(left: &Record, right: &Record, schema: Arc<Schema>) -> DbResult<Record> {
        let values = schema
            .attribute_names()
            .iter()
            .map(|name| {
                left.get(name)
                    .or_else(|| right.get(name))
                    .cloned()
                    .ok_or_else(|| DbError::UnboundVariable { name: name.clone() })
            })
            .collect::<DbResult<Vec<Value>>>()?;
        Record::new(schema, values)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, name) in self.schema.attribute_names().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, self.values[i])?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_schema() -> Arc<Schema> {
        let mut schema = Schema::new();
        schema
            .attribute("projectName")
            .unwrap()
            .attribute("budget")
            .unwrap();
        Arc::new(schema)
    }

    #[test]
    fn test_record_construction_and_lookup() -> DbResult<()> {
        let record = Record::new(
            project_schema(),
            vec![Value::from("P10"), Value::Float(1_000_000.0)],
        )?;
        assert_eq!(record.value(0), &Value::from("P10"));
        assert_eq!(record.get("budget"), Some(&Value::Float(1_000_000.0)));
        assert_eq!(record.get("missing"), None);
        assert_eq!(record.to_string(), "{projectName=P10, budget=1000000.0}");
        Ok(())
    }

    #[test]
    fn test_arity_mismatch() {
        let result = Record::new(project_schema(), vec![Value::from("P10")]);
        assert_eq!(
            result,
            Err(DbError::ArityMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_concatenate_prefers_left() -> DbResult<()> {
        let mut left_schema = Schema::new();
        left_schema.attribute("employeeNumber")?.attribute("projectName")?;
        let left_schema = Arc::new(left_schema);
        let right_schema = project_schema();

        let joined = Arc::new(Schema::join(&left_schema, &right_schema));
        let left = Record::new(
            left_schema,
            vec![Value::from("E00"), Value::from("P00")],
        )?;
        let right = Record::new(
            right_schema,
            vec![Value::from("P00"), Value::Float(1_000_000.0)],
        )?;

        let out = Record::concatenate(&left, &right, joined)?;
        assert_eq!(
            out.to_string(),
            "{employeeNumber=E00, projectName=P00, budget=1000000.0}"
        );
        Ok(())
    }
}
