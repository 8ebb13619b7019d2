//! CSV report adapter.
//!
//! The panel file has one row per bar: `date,close,c1..c11,fulfilled`. The
//! forward-return file is long form, one row per fulfilled date and horizon,
//! with an empty `forward_return` where the horizon runs past the data.

use crate::domain::criteria::Criterion;
use crate::domain::error::VcpError;
use crate::domain::evaluator::Evaluation;
use crate::domain::forward_returns::ForwardReturns;
use crate::ports::report_port::ReportPort;
use serde::Serialize;
use std::path::Path;

pub struct CsvReportAdapter;

#[derive(Debug, Serialize)]
struct ForwardRow {
    date: String,
    close: f64,
    horizon: usize,
    forward_return: Option<f64>,
}

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

fn writer(path: &Path) -> Result<csv::Writer<std::fs::File>, VcpError> {
    Ok(csv::Writer::from_path(path).map_err(std::io::Error::from)?)
}

impl ReportPort for CsvReportAdapter {
    fn write_panel(&self, evaluation: &Evaluation, output_path: &Path) -> Result<(), VcpError> {
        let mut wtr = writer(output_path)?;

        let mut header = vec!["date".to_string(), "close".to_string()];
        header.extend(Criterion::ALL.iter().map(|c| format!("c{}", c.number())));
        header.push("fulfilled".to_string());
        wtr.write_record(&header).map_err(std::io::Error::from)?;

        for i in 0..evaluation.len() {
            let mut record = vec![
                evaluation.dates()[i].to_string(),
                evaluation.closes()[i].to_string(),
            ];
            record.extend(
                evaluation
                    .criteria
                    .row(i)
                    .iter()
                    .map(|&v| flag(v).to_string()),
            );
            record.push(flag(evaluation.fulfillment.values[i]).to_string());
            wtr.write_record(&record).map_err(std::io::Error::from)?;
        }

        wtr.flush()?;
        Ok(())
    }

    fn write_forward_returns(
        &self,
        forward: &ForwardReturns,
        output_path: &Path,
    ) -> Result<(), VcpError> {
        let mut wtr = writer(output_path)?;

        for row in &forward.rows {
            for (&horizon, &forward_return) in forward.horizons.iter().zip(&row.returns) {
                wtr.serialize(ForwardRow {
                    date: row.date.to_string(),
                    close: row.close,
                    horizon,
                    forward_return,
                })
                .map_err(std::io::Error::from)?;
            }
        }

        wtr.flush()?;
        Ok(())
    }
}
