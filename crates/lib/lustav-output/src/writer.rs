use std::fs::File;
use std::path::Path;

use arrow::csv::Writer;
use arrow::datatypes::{Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchWriter};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::OutputResult;

/// Columnar output chosen by file extension, `.parquet` or `.csv`.
#[derive(Debug)]
pub enum WriterType {
    Parquet(WriterParquet),
    Csv(WriterCsv),
}

impl WriterType {
    pub fn new(file_name: &Path, schema: Schema) -> OutputResult<Self> {
        if file_name.exists() {
            std::fs::remove_file(file_name)?;
        }
        match file_name.extension().and_then(|ext| ext.to_str()) {
            Some("parquet") => Ok(WriterType::Parquet(WriterParquet::new(file_name, schema)?)),
            Some("csv") => Ok(WriterType::Csv(WriterCsv::new(file_name)?)),
            _ => Err(format!(
                "unsupported output extension for {}, use .csv or .parquet",
                file_name.display()
            )
            .into()),
        }
    }

    pub fn record_batch_to_file(&mut self, record_batch: &RecordBatch) -> OutputResult<()> {
        match self {
            WriterType::Parquet(to_output) => to_output.writer.write(record_batch)?,
            WriterType::Csv(to_output) => to_output.writer.write(record_batch)?,
        }
        Ok(())
    }

    pub fn close(self) -> OutputResult<()> {
        match self {
            WriterType::Parquet(to_output) => to_output.close(),
            WriterType::Csv(to_output) => to_output.close(),
        }
    }
}

#[derive(Debug)]
pub struct WriterParquet {
    pub writer: ArrowWriter<File>,
}

impl WriterParquet {
    fn new(file_name: &Path, schema: Schema) -> OutputResult<Self> {
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let output_file = File::create(file_name)?;
        let writer = ArrowWriter::try_new(output_file, SchemaRef::from(schema), Some(props))?;
        Ok(Self { writer })
    }

    pub fn close(self) -> OutputResult<()> {
        self.writer.close()?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct WriterCsv {
    pub writer: Writer<File>,
}

impl WriterCsv {
    fn new(file_name: &Path) -> OutputResult<Self> {
        let writer = Writer::new(File::create(file_name)?);
        Ok(Self { writer })
    }

    pub fn close(self) -> OutputResult<()> {
        self.writer.close()?;
        Ok(())
    }
}
