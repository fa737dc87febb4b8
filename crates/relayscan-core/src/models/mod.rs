//! Data models for extracted relay configuration records.

pub mod parameter;
pub mod relay;
pub mod report;

pub use parameter::RawParameter;
pub use relay::{
    CurrentTransformerReading, ProtectionFunctionRecord, RelayRecord, TransformerKind,
    VoltageSource, VoltageTransformerReading,
};
pub use report::ValidationReport;
