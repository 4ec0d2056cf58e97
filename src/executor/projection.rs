//! Projection operator: rewrites each input record through arithmetic
//! expressions.

use crate::error::{DbError, DbResult};
use crate::executor::{Operator, RecordStream};
use crate::expression::{Evaluated, Expression, ExpressionEvaluator};
use crate::record::Record;
use crate::schema::Schema;
use crate::value::Value;
use std::sync::Arc;

/// Produces one output record per input record. The output schema holds the
/// given attribute names in order; each attribute's value comes from
/// evaluating its expression against the input record. Unlike selection,
/// evaluation failures here propagate and end the stream.
pub struct Projection<'a> {
    input: Box<dyn Operator<'a> + 'a>,
    evaluators: Vec<ExpressionEvaluator>,
    output_schema: Arc<Schema>,
}

impl<'a> Projection<'a> {
    /// `definitions` pairs each output attribute name with its expression,
    /// in output order. Duplicate names and unbound variables fail here.
    pub fn new(
        input: Box<dyn Operator<'a> + 'a>,
        definitions: Vec<(String, Expression)>,
    ) -> DbResult<Self> {
        let mut output_schema = Schema::new();
        let mut evaluators = Vec::with_capacity(definitions.len());
        for (name, expression) in definitions {
            output_schema.attribute(&name)?;
            evaluators.push(ExpressionEvaluator::new(expression, input.output_schema())?);
        }
        Ok(Projection {
            input,
            evaluators,
            output_schema: Arc::new(output_schema),
        })
    }
}

impl<'a> Operator<'a> for Projection<'a> {
    fn output_schema(&self) -> &Schema {
        &self.output_schema
    }

    fn stream(&self) -> RecordStream<'a> {
        let evaluators = self.evaluators.clone();
        let schema = self.output_schema.clone();
        let mapped = self.input.stream().map(move |item| {
            let record = item?;
            let values = evaluators
                .iter()
                .map(|evaluator| match evaluator.evaluate(&record)? {
                    Evaluated::Value(v) => Ok(v),
                    Evaluated::Bool(_) => Err(DbError::unsupported(
                        "projection expression produced a boolean",
                    )),
                })
                .collect::<DbResult<Vec<Value>>>()?;
            Record::new(schema.clone(), values)
        });
        // the sequence ends at the record whose evaluation failed
        Box::new(mapped.scan(false, |failed, item| {
            if *failed {
                return None;
            }
            *failed = item.is_err();
            Some(item)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Scan;
    use crate::table::Table;

    fn projects() -> DbResult<Table> {
        let mut schema = Schema::new();
        schema.attribute("projectName")?.attribute("budget")?;
        schema.key(&["projectName"])?;
        let mut table = Table::new(schema);
        table.insert_record(vec![Value::from("P00"), Value::Float(1_000_000.0)])?;
        table.insert_record(vec![Value::from("P01"), Value::Float(2_000_000.0)])?;
        Ok(table)
    }

    fn definitions(defs: &[(&str, &str)]) -> DbResult<Vec<(String, Expression)>> {
        defs.iter()
            .map(|(name, text)| Ok((name.to_string(), Expression::arithmetic(text)?)))
            .collect()
    }

    #[test]
    fn test_projection_rewrites_records() -> DbResult<()> {
        let table = projects()?;
        let projection = Projection::new(
            Box::new(Scan::new(&table)),
            definitions(&[("projectName", "projectName"), ("half", "budget / 2")])?,
        )?;
        assert_eq!(
            projection.output_schema().attribute_names(),
            ["projectName", "half"]
        );

        let rows: Vec<Record> = projection.stream().collect::<DbResult<_>>()?;
        assert_eq!(rows[0].get("half"), Some(&Value::Float(500_000.0)));
        assert_eq!(rows[1].get("half"), Some(&Value::Float(1_000_000.0)));
        Ok(())
    }

    #[test]
    fn test_duplicate_output_attribute_rejected() -> DbResult<()> {
        let table = projects()?;
        let result = Projection::new(
            Box::new(Scan::new(&table)),
            definitions(&[("a", "budget"), ("a", "budget")])?,
        );
        assert!(matches!(result, Err(DbError::DuplicateAttribute { .. })));
        Ok(())
    }

    #[test]
    fn test_evaluation_errors_propagate() -> DbResult<()> {
        let table = projects()?;
        // projectName cannot be coerced to a number
        let projection = Projection::new(
            Box::new(Scan::new(&table)),
            definitions(&[("doubled", "projectName * 2")])?,
        )?;
        let result: DbResult<Vec<Record>> = projection.stream().collect();
        assert!(matches!(result, Err(DbError::NumberFormat { .. })));
        Ok(())
    }
}
