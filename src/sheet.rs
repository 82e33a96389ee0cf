/// Tabular input driving a run: one row per photo sequence, grouped by the
/// group-key column. Loaded fully into memory and written back once at the
/// end; unknown columns pass through untouched.
use crate::error::{AppError, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::path::Path;
use tracing::debug;

pub const COL_GROUP: &str = "GROUP";
pub const COL_LOCALITY_TEAM: &str = "LOCALITY_TEAM";
pub const COL_SEQUENCE: &str = "SEQUENCE";
pub const COL_PHOTOS: &str = "PHOTOS";
pub const COL_PHOTOS_MOVED: &str = "PHOTOS_MOVED";
pub const COL_DRIVE_FOLDER: &str = "DRIVE_FOLDER";

pub struct Sheet {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    group_idx: usize,
    locality_idx: usize,
    sequence_idx: usize,
    photos_idx: usize,
    moved_idx: usize,
    folder_idx: usize,
}

impl Sheet {
    pub fn read(path: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;

        let mut headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }

        let required = |headers: &[String], name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| AppError::Sheet {
                    message: format!("missing required column '{}'", name),
                })
        };

        let group_idx = required(&headers, COL_GROUP)?;
        let locality_idx = required(&headers, COL_LOCALITY_TEAM)?;
        let sequence_idx = required(&headers, COL_SEQUENCE)?;
        let photos_idx = required(&headers, COL_PHOTOS)?;

        // Output columns are appended when the sheet does not carry them yet.
        let ensure = |name: &str, headers: &mut Vec<String>| match headers
            .iter()
            .position(|h| h == name)
        {
            Some(idx) => idx,
            None => {
                headers.push(name.to_string());
                headers.len() - 1
            }
        };
        let moved_idx = ensure(COL_PHOTOS_MOVED, &mut headers);
        let folder_idx = ensure(COL_DRIVE_FOLDER, &mut headers);

        for row in &mut rows {
            if row.len() < headers.len() {
                row.resize(headers.len(), String::new());
            }
        }

        debug!("read {} rows from '{}'", rows.len(), path.display());

        Ok(Self {
            headers,
            rows,
            group_idx,
            locality_idx,
            sequence_idx,
            photos_idx,
            moved_idx,
            folder_idx,
        })
    }

    /// Overwrite the spreadsheet with the current in-memory rows.
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut writer = WriterBuilder::new().from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        debug!("wrote {} rows to '{}'", self.rows.len(), path.display());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row indexes grouped by the group key, in first-seen order.
    pub fn groups(&self) -> Vec<(String, Vec<usize>)> {
        let mut order: Vec<String> = Vec::new();
        let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();

        for (index, row) in self.rows.iter().enumerate() {
            let key = row[self.group_idx].clone();
            if !by_key.contains_key(&key) {
                order.push(key.clone());
            }
            by_key.entry(key).or_default().push(index);
        }

        order
            .into_iter()
            .map(|key| {
                let indexes = by_key.remove(&key).unwrap_or_default();
                (key, indexes)
            })
            .collect()
    }

    pub fn sequence(&self, index: usize) -> &str {
        &self.rows[index][self.sequence_idx]
    }

    /// Split the combined `<locality>_<team>` label; the team is rendered
    /// with a leading capital to match the folder naming convention.
    pub fn locality_team(&self, index: usize) -> Result<(String, String)> {
        let raw = &self.rows[index][self.locality_idx];
        let (locality, team) = raw.split_once('_').ok_or_else(|| AppError::Sheet {
            message: format!("malformed locality/team label '{}'", raw),
        })?;
        Ok((locality.to_string(), capitalize(team)))
    }

    /// Parse the photo interval `"<start>-<end>"` into inclusive numeric
    /// bounds. A single number denotes a one-photo interval.
    pub fn photo_range(&self, index: usize) -> Result<RangeInclusive<u32>> {
        let raw = &self.rows[index][self.photos_idx];
        let invalid = || AppError::Sheet {
            message: format!("invalid photo interval '{}'", raw),
        };

        let mut parts = raw.split('-');
        let start: u32 = parts
            .next()
            .ok_or_else(invalid)?
            .trim()
            .parse()
            .map_err(|_| invalid())?;
        let end: u32 = match parts.last() {
            Some(last) => last.trim().parse().map_err(|_| invalid())?,
            None => start,
        };

        Ok(start..=end)
    }

    /// Record the per-row results into the two output cells.
    pub fn set_outputs(&mut self, index: usize, photos_moved: u32, folder_sequence: u32) {
        self.rows[index][self.moved_idx] = photos_moved.to_string();
        self.rows[index][self.folder_idx] = folder_sequence.to_string();
    }

    pub fn output_cells(&self, index: usize) -> (&str, &str) {
        (
            &self.rows[index][self.moved_idx],
            &self.rows[index][self.folder_idx],
        )
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
