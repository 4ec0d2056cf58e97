//! Scan operator: reads every record of a table in key order.

use crate::executor::{Operator, RecordStream};
use crate::schema::Schema;
use crate::table::Table;

/// Wraps a table; each `stream()` call starts a fresh iteration over the
/// table's sorted index.
pub struct Scan<'a> {
    table: &'a Table,
}

impl<'a> Scan<'a> {
    pub fn new(table: &'a Table) -> Self {
        Scan { table }
    }
}

impl<'a> Operator<'a> for Scan<'a> {
    fn output_schema(&self) -> &Schema {
        self.table.schema()
    }

    fn stream(&self) -> RecordStream<'a> {
        let table = self.table;
        Box::new(table.records().cloned().map(Ok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbResult;
    use crate::value::Value;

    #[test]
    fn test_scan_yields_key_order_and_restarts() -> DbResult<()> {
        let mut schema = Schema::new();
        schema.attribute("projectName")?.attribute("budget")?;
        schema.key(&["projectName"])?;
        let mut table = Table::new(schema);
        table.insert_record(vec![Value::from("P01"), Value::Float(2.0)])?;
        table.insert_record(vec![Value::from("P00"), Value::Float(1.0)])?;

        let scan = Scan::new(&table);
        assert_eq!(scan.output_schema().attribute_names(), ["projectName", "budget"]);

        for _ in 0..2 {
            let names: Vec<String> = scan
                .stream()
                .map(|r| r.unwrap().get("projectName").unwrap().to_string())
                .collect();
            assert_eq!(names, ["P00", "P01"]);
        }
        Ok(())
    }
}
