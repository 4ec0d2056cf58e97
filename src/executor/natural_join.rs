//! Natural join operator: matches each input record against a referenced
//! table on their common attributes.

use crate::executor::{Operator, RecordStream};
use crate::record::Record;
use crate::schema::Schema;
use crate::table::Table;
use std::sync::Arc;

/// Joins an input operator with a table. The output schema is the input
/// schema followed by the table's attributes not already present. For each
/// input record the table is probed on the common attributes; when those
/// cover the table's primary key the probe is a single key lookup.
pub struct NaturalJoin<'a> {
    input: Box<dyn Operator<'a> + 'a>,
    table: &'a Table,
    common_attributes: Vec<String>,
    output_schema: Arc<Schema>,
}

impl<'a> NaturalJoin<'a> {
    pub fn new(input: Box<dyn Operator<'a> + 'a>, table: &'a Table) -> Self {
        let common_attributes = input.output_schema().common_attributes(table.schema());
        let output_schema = Arc::new(Schema::join(input.output_schema(), table.schema()));
        NaturalJoin {
            input,
            table,
            common_attributes,
            output_schema,
        }
    }
}

impl<'a> Operator<'a> for NaturalJoin<'a> {
    fn output_schema(&self) -> &Schema {
        &self.output_schema
    }

    fn stream(&self) -> RecordStream<'a> {
        let table = self.table;
        let common = self.common_attributes.clone();
        let schema = self.output_schema.clone();
        Box::new(self.input.stream().flat_map(move |item| {
            let results: Vec<_> = match item {
                Ok(left) => table
                    .matching_records(&left, &common)
                    .into_iter()
                    .map(|matched| Record::concatenate(&left, matched, schema.clone()))
                    .collect(),
                Err(e) => vec![Err(e)],
            };
            results.into_iter()
        }))
    }
}
