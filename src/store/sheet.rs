use crate::error::{Result, StoreError};
use crate::models::{Dataset, Row};
use std::collections::HashSet;
use std::io::{Read, Write};

const UTF8_BOM: char = '\u{feff}';

/// 从 CSV 表格解析数据集 (首行为表头)
pub fn read_dataset<R: Read>(reader: R) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = csv_reader.records();

    // 1. 表头
    let Some(header) = records.next() else {
        return Ok(Dataset::default());
    };
    let header = header?;
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            if idx == 0 {
                name.trim_start_matches(UTF8_BOM).to_string()
            } else {
                name.to_string()
            }
        })
        .collect();

    let mut seen = HashSet::with_capacity(columns.len());
    for column in &columns {
        if !seen.insert(column.as_str()) {
            return Err(StoreError::StorageUnavailable(format!(
                "duplicate column '{}' in header",
                column
            )));
        }
    }

    // 2. 数据行，短行补空单元格
    let mut rows = Vec::new();
    for (idx, record) in records.enumerate() {
        let record = record?;
        if record.len() > columns.len() {
            return Err(StoreError::StorageUnavailable(format!(
                "record {} has {} fields but header has {}",
                idx + 1,
                record.len(),
                columns.len()
            )));
        }

        let mut row = Row::default();
        for (pos, column) in columns.iter().enumerate() {
            row.set_cell(column, record.get(pos).unwrap_or(""));
        }
        rows.push(row);
    }

    Ok(Dataset::new(columns, rows))
}

/// 将数据集写成 CSV 表格，列顺序与表头一致
pub fn write_dataset<W: Write>(writer: W, dataset: &Dataset) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().flexible(false).from_writer(writer);

    let header = dataset.header();
    csv_writer.write_record(&header)?;

    for row in &dataset.rows {
        csv_writer.write_record(header.iter().map(|column| row.cell(column).unwrap_or("")))?;
    }

    csv_writer.flush()?;
    Ok(())
}
