pub mod minipool_report;
pub mod pool_types;
