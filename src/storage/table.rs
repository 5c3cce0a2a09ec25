use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::domain::{Cents, ValidationError, parse_cents, parse_date, parse_timestamp};

use super::{StorageError, StoreError, TableName};

/// A record type persisted as one CSV table.
///
/// The first entry of `COLUMNS` is the identifier column.
pub trait Record: Clone + Sized {
    const TABLE: TableName;
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> &str;

    /// Build a record from one row, in `COLUMNS` order.
    fn from_row(row: &Row<'_>) -> Result<Self, ValidationError>;

    /// Render the record as one row, in `COLUMNS` order.
    fn to_row(&self) -> Vec<String>;

    fn validate(&self) -> Result<(), ValidationError>;
}

/// One row of text values laid out in a record's column order.
pub struct Row<'a> {
    columns: &'static [&'static str],
    values: &'a [String],
}

impl<'a> Row<'a> {
    pub fn new(columns: &'static [&'static str], values: &'a [String]) -> Self {
        Self { columns, values }
    }

    /// Raw text of a column, empty if absent.
    pub fn text(&self, column: &str) -> &'a str {
        self.columns
            .iter()
            .position(|c| *c == column)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Raw text of a column that must not be blank.
    pub fn required(&self, column: &str) -> Result<&'a str, ValidationError> {
        let value = self.text(column);
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField(column.to_string()));
        }
        Ok(value)
    }

    /// `None` for a blank column.
    pub fn optional(&self, column: &str) -> Option<&'a str> {
        let value = self.text(column);
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    }

    pub fn parse_enum<T>(
        &self,
        column: &str,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Result<T, ValidationError> {
        let value = self.required(column)?;
        parse(value).ok_or_else(|| ValidationError::invalid(column, value, "unknown value"))
    }

    pub fn cents(&self, column: &str) -> Result<Cents, ValidationError> {
        let value = self.required(column)?;
        parse_cents(value).map_err(|e| ValidationError::invalid(column, value, e.to_string()))
    }

    pub fn timestamp(&self, column: &str) -> Result<DateTime<Utc>, ValidationError> {
        parse_timestamp(column, self.required(column)?)
    }

    pub fn optional_timestamp(&self, column: &str) -> Result<Option<DateTime<Utc>>, ValidationError> {
        self.optional(column)
            .map(|value| parse_timestamp(column, value))
            .transpose()
    }

    pub fn date(&self, column: &str) -> Result<NaiveDate, ValidationError> {
        parse_date(column, self.required(column)?)
    }
}

fn column_position<R: Record>(field: &str) -> Result<usize, ValidationError> {
    R::COLUMNS
        .iter()
        .position(|c| *c == field)
        .ok_or_else(|| ValidationError::UnknownField {
            table: R::TABLE.as_str(),
            field: field.to_string(),
        })
}

fn parse_record<R: Record>(values: &[String]) -> Result<R, ValidationError> {
    let record = R::from_row(&Row::new(R::COLUMNS, values))?;
    record.validate()?;
    Ok(record)
}

/// An ordered, fully in-memory table mirrored to a CSV file.
///
/// Every mutation rewrites the whole file. There is no locking: a concurrent
/// writer to the same file wins or loses silently.
#[derive(Debug, Clone)]
pub struct Table<R: Record> {
    path: PathBuf,
    records: Vec<R>,
}

impl<R: Record> Table<R> {
    /// Load a table from disk. Fails if the file is missing or any row is malformed.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let records = read_records::<R>(&path)?;
        debug!(
            table = R::TABLE.as_str(),
            rows = records.len(),
            path = %path.display(),
            "loaded table"
        );
        Ok(Self { path, records })
    }

    /// Write a header-only file for this table.
    pub fn create_empty(path: impl AsRef<Path>) -> Result<(), StorageError> {
        write_records::<R>(path.as_ref(), &[])
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file and return the fresh records.
    /// On failure the in-memory records are left as they were.
    pub fn read_all(&mut self) -> Result<&[R], StorageError> {
        self.records = read_records::<R>(&self.path)?;
        Ok(&self.records)
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get_by_id(id).is_some()
    }

    /// Records whose `field` column equals `value`, in scan order.
    pub fn get_by_foreign_key(&self, field: &str, value: &str) -> Result<Vec<&R>, ValidationError> {
        let position = column_position::<R>(field)?;
        Ok(self
            .records
            .iter()
            .filter(|r| r.to_row().get(position).map(String::as_str) == Some(value))
            .collect())
    }

    /// Validate and append a record, then rewrite the file.
    pub fn append(&mut self, record: R) -> Result<&R, StoreError> {
        record.validate()?;
        if self.contains(record.id()) {
            return Err(ValidationError::DuplicateId {
                table: R::TABLE.as_str(),
                id: record.id().to_string(),
            }
            .into());
        }

        self.records.push(record);
        if let Err(e) = self.persist() {
            self.records.pop();
            return Err(e.into());
        }

        let index = self.records.len() - 1;
        let appended = &self.records[index];
        debug!(table = R::TABLE.as_str(), id = appended.id(), "appended record");
        Ok(appended)
    }

    /// Overwrite named columns of one record, then rewrite the file.
    ///
    /// The updated row is parsed again, so new values are validated exactly
    /// like loaded ones. The identifier column cannot change.
    pub fn update_fields(&mut self, id: &str, updates: &[(&str, &str)]) -> Result<&R, StoreError> {
        let index = self
            .records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| StoreError::NotFound {
                table: R::TABLE.as_str(),
                id: id.to_string(),
            })?;

        let mut values = self.records[index].to_row();
        for (field, value) in updates {
            let position = column_position::<R>(field)?;
            if position == 0 && *value != id {
                return Err(ValidationError::ImmutableField(field.to_string()).into());
            }
            values[position] = value.to_string();
        }

        let updated = parse_record::<R>(&values)?;
        let previous = std::mem::replace(&mut self.records[index], updated);
        if let Err(e) = self.persist() {
            self.records[index] = previous;
            return Err(e.into());
        }

        debug!(
            table = R::TABLE.as_str(),
            id,
            fields = updates.len(),
            "updated record"
        );
        Ok(&self.records[index])
    }

    /// Replace every record at once with a single rewrite.
    pub fn replace_all(&mut self, records: Vec<R>) -> Result<(), StoreError> {
        let mut seen = HashSet::new();
        for record in &records {
            record.validate()?;
            if !seen.insert(record.id()) {
                return Err(ValidationError::DuplicateId {
                    table: R::TABLE.as_str(),
                    id: record.id().to_string(),
                }
                .into());
            }
        }

        let previous = std::mem::replace(&mut self.records, records);
        if let Err(e) = self.persist() {
            self.records = previous;
            return Err(e.into());
        }
        debug!(table = R::TABLE.as_str(), rows = self.records.len(), "replaced table");
        Ok(())
    }

    fn persist(&self) -> Result<(), StorageError> {
        write_records(&self.path, &self.records)
    }
}

fn read_records<R: Record>(path: &Path) -> Result<Vec<R>, StorageError> {
    if !path.exists() {
        return Err(StorageError::MissingFile(path.to_path_buf()));
    }

    let csv_err = |source| StorageError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    let headers = reader.headers().map_err(csv_err)?.clone();

    let positions = R::COLUMNS
        .iter()
        .map(|column| {
            headers
                .iter()
                .position(|h| h.trim() == *column)
                .ok_or_else(|| StorageError::MissingColumn {
                    path: path.to_path_buf(),
                    column,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut records: Vec<R> = Vec::new();
    let mut seen = HashSet::new();

    for (index, result) in reader.records().enumerate() {
        let row = result.map_err(csv_err)?;
        let line = row
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 2);

        let values: Vec<String> = positions
            .iter()
            .map(|&p| row.get(p).unwrap_or("").to_string())
            .collect();

        let malformed = |source| StorageError::Malformed {
            path: path.to_path_buf(),
            line,
            source,
        };

        let record = parse_record::<R>(&values).map_err(malformed)?;
        if !seen.insert(record.id().to_string()) {
            return Err(malformed(ValidationError::DuplicateId {
                table: R::TABLE.as_str(),
                id: record.id().to_string(),
            }));
        }
        records.push(record);
    }

    Ok(records)
}

fn write_records<R: Record>(path: &Path, records: &[R]) -> Result<(), StorageError> {
    let csv_err = |source| StorageError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(R::COLUMNS).map_err(csv_err)?;
    for record in records {
        writer.write_record(record.to_row()).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
