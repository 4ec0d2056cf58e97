//! Relational operator pipeline.
//!
//! Every operator exposes its output schema, computed eagerly at
//! construction, and a factory for a lazy record stream. Streams are finite,
//! single-pass pull iterators; no operator prefetches. A stream owns the
//! per-run state it needs (evaluators, accumulator specs), cloned out of the
//! operator, so repeated `stream()` calls and concurrent streams are
//! independent of each other.

use crate::error::DbResult;
use crate::record::Record;
use crate::schema::Schema;

pub mod aggregate;
pub mod natural_join;
pub mod projection;
pub mod scan;
pub mod selection;

pub use aggregate::{Aggregation, AggregateFunction};
pub use natural_join::NaturalJoin;
pub use projection::Projection;
pub use scan::Scan;
pub use selection::Selection;

/// A lazy, single-pass sequence of records. Items are `Err` when producing
/// the record failed; the stream ends after yielding an error.
pub type RecordStream<'a> = Box<dyn Iterator<Item = DbResult<Record>> + 'a>;

/// A node in the query pipeline. The lifetime parameter ties operators and
/// their streams to the tables they read.
pub trait Operator<'a> {
    /// The schema of the records this operator produces.
    fn output_schema(&self) -> &Schema;

    /// Starts a new pass over this operator's output. Scan re-reads its
    /// table on every call; composed pipelines make no replay promise beyond
    /// what their inputs give them.
    fn stream(&self) -> RecordStream<'a>;
}
