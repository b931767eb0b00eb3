use std::path::{Path, PathBuf};

pub const OUTPUT_DIR: &str = "output";

pub const TABLE_ENTITIES: &str = "entities";
pub const TABLE_COMMUNITIES: &str = "communities";
pub const TABLE_COMMUNITY_REPORTS: &str = "community_reports";

pub const PARQUET_EXTENSION: &str = "parquet";

/// Resolves `<root>/<output_dir>/<table>.parquet`.
#[must_use]
pub fn table_path(root: &Path, output_dir: &str, table: &str) -> PathBuf {
    root.join(output_dir)
        .join(table)
        .with_extension(PARQUET_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_path_joins_output_dir() {
        let path = table_path(Path::new("/srv/graphrag"), OUTPUT_DIR, TABLE_COMMUNITY_REPORTS);
        assert_eq!(
            path,
            PathBuf::from("/srv/graphrag/output/community_reports.parquet")
        );
    }
}
