//! Screen report port.

use crate::domain::error::VcpError;
use crate::domain::evaluator::Evaluation;
use crate::domain::forward_returns::ForwardReturns;
use std::path::Path;

/// Port for persisting per-symbol screen results.
pub trait ReportPort {
    /// Close, every criterion and the fulfillment flag, one row per bar.
    fn write_panel(&self, evaluation: &Evaluation, output_path: &Path) -> Result<(), VcpError>;

    fn write_forward_returns(
        &self,
        forward: &ForwardReturns,
        output_path: &Path,
    ) -> Result<(), VcpError>;
}
