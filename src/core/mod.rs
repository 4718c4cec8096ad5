pub mod aggregator;
pub mod etl;
pub mod pipeline;
pub mod validator;

pub use crate::domain::model::{
    AggregateResult, RawRecord, RejectReason, RuleSet, TopProducts, TransformResult, ValidSale,
    ValidationOutcome, ValidationReport,
};
pub use crate::domain::ports::{Pipeline, RecordSource, Storage};
pub use crate::utils::error::Result;
