use std::{error::Error, fmt, fs::File, path::Path, path::PathBuf};

use parquet::errors::ParquetError;
use parquet::file::reader::{FileReader, SerializedFileReader};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::{Artifacts, Community, CommunityReport, Entity};
use crate::schema::{TABLE_COMMUNITIES, TABLE_COMMUNITY_REPORTS, TABLE_ENTITIES, table_path};

#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: std::io::Error },
    Parquet { path: PathBuf, source: Box<ParquetError> },
    Decode { path: PathBuf, row: usize, source: serde_json::Error },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to open {}: {source}", path.display()),
            Self::Parquet { path, source } => {
                write!(f, "failed to read parquet file {}: {source}", path.display())
            }
            Self::Decode { path, row, source } => {
                write!(f, "invalid row {row} in {}: {source}", path.display())
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parquet { source, .. } => Some(source.as_ref()),
            Self::Decode { source, .. } => Some(source),
        }
    }
}

impl StoreError {
    /// Returns true when the underlying file does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Reads every row of a parquet file and decodes it into `T`.
///
/// Rows are converted to JSON objects keyed by column name first, so `T` only
/// needs to name the columns it cares about.
///
/// # Errors
/// Returns an error if the file cannot be opened, is not valid parquet, or a
/// row does not decode into `T`.
pub fn read_table<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    let file = File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parquet_err = |source: ParquetError| StoreError::Parquet {
        path: path.to_path_buf(),
        source: Box::new(source),
    };
    let reader = SerializedFileReader::new(file).map_err(parquet_err)?;
    let rows = reader.get_row_iter(None).map_err(parquet_err)?;

    let mut records = Vec::new();
    for (index, row) in rows.enumerate() {
        let row = row.map_err(parquet_err)?;
        let record = serde_json::from_value(row.to_json_value()).map_err(|source| {
            StoreError::Decode {
                path: path.to_path_buf(),
                row: index,
                source,
            }
        })?;
        records.push(record);
    }
    debug!(path = %path.display(), rows = records.len(), "loaded parquet table");
    Ok(records)
}

/// Loads entities, communities and community reports from `<root>/<output_dir>`.
///
/// # Errors
/// Returns the first table that fails to load.
pub fn load_artifacts(root: &Path, output_dir: &str) -> StoreResult<Artifacts> {
    let entities = read_table::<Entity>(&table_path(root, output_dir, TABLE_ENTITIES))?;
    let communities = read_table::<Community>(&table_path(root, output_dir, TABLE_COMMUNITIES))?;
    let community_reports =
        read_table::<CommunityReport>(&table_path(root, output_dir, TABLE_COMMUNITY_REPORTS))?;
    Ok(Artifacts {
        entities,
        communities,
        community_reports,
    })
}
