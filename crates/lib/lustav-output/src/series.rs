use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, RecordBatch, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use log::debug;

use lustav_core::metrics::{MetricKind, MetricSeries};
use lustav_core::rate::PenetrationRate;

use crate::writer::WriterType;
use crate::OutputResult;

pub const TIME_STEP: &str = "time_step";
pub const AV_RATE: &str = "av_rate";

/// Writes the per-step metric values of every run into one table.
#[derive(Debug)]
pub struct SeriesWriter {
    to_output: WriterType,
}

impl SeriesWriter {
    pub fn new(output_file: &Path) -> OutputResult<Self> {
        Ok(Self {
            to_output: WriterType::new(output_file, Self::schema())?,
        })
    }

    pub fn schema() -> Schema {
        let mut fields = vec![
            Field::new(TIME_STEP, DataType::UInt64, false),
            Field::new(AV_RATE, DataType::Float64, false),
        ];
        fields.extend(
            MetricKind::ALL
                .iter()
                .map(|kind| Field::new(kind.name(), DataType::Float64, false)),
        );
        Schema::new(fields)
    }

    pub fn add_run(&mut self, rate: PenetrationRate, series: &MetricSeries) -> OutputResult<()> {
        let steps = series.len();
        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(UInt64Array::from_iter_values(0..steps as u64)) as ArrayRef,
            Arc::new(Float64Array::from(vec![rate.as_f64(); steps])) as ArrayRef,
        ];
        for kind in MetricKind::ALL.iter() {
            columns.push(Arc::new(Float64Array::from(series.values(*kind).to_vec())));
        }
        let record_batch = RecordBatch::try_new(Arc::new(Self::schema()), columns)?;
        debug!("Writing {} series rows for rate {}", steps, rate);
        self.to_output.record_batch_to_file(&record_batch)
    }

    pub fn close_file(self) -> OutputResult<()> {
        self.to_output.close()
    }
}
