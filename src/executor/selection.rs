//! Selection operator: keeps the records satisfying a predicate.

use crate::error::DbResult;
use crate::executor::{Operator, RecordStream};
use crate::expression::{Evaluated, Expression, ExpressionEvaluator};
use crate::schema::Schema;

/// Filters its input by a predicate string, parsed as a logical expression
/// at construction. A record passes only when the predicate evaluates to
/// true; records whose evaluation fails (for example a string attribute in a
/// numeric comparison) are dropped rather than aborting the query.
pub struct Selection<'a> {
    input: Box<dyn Operator<'a> + 'a>,
    evaluator: ExpressionEvaluator,
    predicate: String,
}

impl<'a> Selection<'a> {
    /// Parsing and binding failures surface here, before any record flows.
    pub fn new(input: Box<dyn Operator<'a> + 'a>, predicate: &str) -> DbResult<Self> {
        let evaluator =
            ExpressionEvaluator::new(Expression::logical(predicate)?, input.output_schema())?;
        Ok(Selection {
            input,
            evaluator,
            predicate: predicate.to_string(),
        })
    }

    pub fn predicate(&self) -> &str {
        &self.predicate
    }
}

impl<'a> Operator<'a> for Selection<'a> {
    fn output_schema(&self) -> &Schema {
        self.input.output_schema()
    }

    fn stream(&self) -> RecordStream<'a> {
        let evaluator = self.evaluator.clone();
        Box::new(self.input.stream().filter(move |item| match item {
            // upstream failures pass through to the consumer
            Err(_) => true,
            Ok(record) => matches!(evaluator.evaluate(record), Ok(Evaluated::Bool(true))),
        }))
    }
}
