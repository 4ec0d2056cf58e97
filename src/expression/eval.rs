//! Binding expressions to schemas and evaluating them on records.

use super::node::Evaluated;
use super::parser::Expression;
use crate::error::{DbError, DbResult};
use crate::record::Record;
use crate::schema::Schema;
use crate::value::Value;

/// Evaluates one expression against records of one schema. Construction
/// resolves every variable name to its attribute index; evaluation gathers
/// the record's values for those indices into an environment and evaluates
/// the tree. Clones are cheap and independent, so each record stream owns
/// its own evaluator.
#[derive(Debug, Clone)]
pub struct ExpressionEvaluator {
    expression: Expression,
    indices: Vec<usize>,
}

impl ExpressionEvaluator {
    /// Fails when a variable of the expression names no attribute of the
    /// schema.
    pub fn new(expression: Expression, schema: &Schema) -> DbResult<Self> {
        let indices = expression
            .variables()
            .iter()
            .map(|name| {
                schema
                    .index_of(name)
                    .ok_or_else(|| DbError::UnboundVariable { name: name.clone() })
            })
            .collect::<DbResult<Vec<usize>>>()?;
        Ok(ExpressionEvaluator {
            expression,
            indices,
        })
    }

    /// Evaluates the expression on one record.
    pub fn evaluate(&self, record: &Record) -> DbResult<Evaluated> {
        let env: Vec<Value> = self
            .indices
            .iter()
            .map(|&i| record.value(i).clone())
            .collect();
        self.expression.evaluate(&env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn project_record(name: &str, budget: f64) -> Record {
        let mut schema = Schema::new();
        schema
            .attribute("projectName")
            .unwrap()
            .attribute("budget")
            .unwrap();
        Record::new(
            Arc::new(schema),
            vec![Value::from(name), Value::Float(budget)],
        )
        .unwrap()
    }

    #[test]
    fn test_evaluate_against_record() -> DbResult<()> {
        let record = project_record("P01", 2_000_000.0);
        let schema = record.schema().clone();

        let predicate =
            ExpressionEvaluator::new(Expression::logical("budget > 1000000")?, &schema)?;
        assert_eq!(predicate.evaluate(&record)?, Evaluated::Bool(true));

        let halved =
            ExpressionEvaluator::new(Expression::arithmetic("budget / 2")?, &schema)?;
        assert_eq!(
            halved.evaluate(&record)?,
            Evaluated::Value(Value::Float(1_000_000.0))
        );
        Ok(())
    }

    #[test]
    fn test_unbound_variable_detected_at_construction() -> DbResult<()> {
        let record = project_record("P01", 2_000_000.0);
        let result =
            ExpressionEvaluator::new(Expression::logical("salary > 10")?, record.schema());
        assert_eq!(
            result.err(),
            Some(DbError::UnboundVariable {
                name: "salary".to_string()
            })
        );
        Ok(())
    }
}
