pub mod loaders;
pub mod outcome;
pub mod record;
pub mod report;

pub use loaders::{load_records, records_from_rows};
pub use outcome::{AttemptResult, RecordOutcome, RecordStatus};
pub use record::Record;
pub use report::ExecutionReport;
