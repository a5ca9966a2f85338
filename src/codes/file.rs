//! Code file loader.
//!
//! A code file is TOML with one array of tables per code table:
//!
//! ```toml
//! [[well_class]]
//! code = "WATR_SPPLY"
//! description = "Water Supply"
//! display_order = 10
//!
//! [[well_subclass]]
//! code = "DOMESTIC"
//! description = "Domestic"
//! parent = "WATR_SPPLY"
//! expiry_date = "2030-01-01"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use super::{CodeCatalog, CodeEntry, CodeError, CodeTableKind};

#[derive(Debug, Error)]
pub enum CodeFileError {
    #[error("code file I/O error ({0}): {1}")]
    Io(PathBuf, std::io::Error),
    #[error("code file parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown code table '{0}'")]
    UnknownTable(String),
}

/// Entries of a code file grouped by table.
pub type CodeFileTables = Vec<(CodeTableKind, Vec<CodeEntry>)>;

/// Parse code file contents. Well classes come ahead of subclasses regardless
/// of file order so a file may define a class and its subclasses together.
pub fn parse_code_tables(contents: &str) -> Result<CodeFileTables, CodeFileError> {
    let raw: BTreeMap<String, Vec<CodeEntry>> = toml::from_str(contents)?;

    let mut tables = Vec::with_capacity(raw.len());
    for (name, entries) in raw {
        let kind =
            CodeTableKind::from_table_name(&name).ok_or(CodeFileError::UnknownTable(name))?;
        tables.push((kind, entries));
    }
    tables.sort_by_key(|(kind, _)| *kind);
    Ok(tables)
}

/// Read and parse a code file.
pub fn read_code_file(path: &Path) -> Result<CodeFileTables, CodeFileError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| CodeFileError::Io(path.to_path_buf(), e))?;
    let tables = parse_code_tables(&contents)?;

    let entries: usize = tables.iter().map(|(_, e)| e.len()).sum();
    info!(path = %path.display(), tables = tables.len(), entries, "Read code file");
    Ok(tables)
}

/// Apply parsed tables over a catalog. Subclass parents may live in either
/// the catalog or the tables. Returns the number of entries applied.
pub fn apply_code_tables(tables: CodeFileTables, base: &mut CodeCatalog) -> Result<usize, CodeError> {
    let mut count = 0;
    for (kind, entries) in tables {
        for entry in entries {
            base.upsert(kind, entry)?;
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_classes_and_subclasses_in_any_order() {
        let contents = r#"
[[well_subclass]]
code = "DOMESTIC"
description = "Domestic"
parent = "WATR_SPPLY"

[[well_class]]
code = "WATR_SPPLY"
description = "Water Supply"
display_order = 10
"#;
        let mut catalog = CodeCatalog::new();
        apply_code_tables(parse_code_tables(contents).unwrap(), &mut catalog).unwrap();
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(catalog
            .active(CodeTableKind::WellSubclass, as_of)
            .contains_under("DOMESTIC", "WATR_SPPLY"));
    }

    #[test]
    fn test_unknown_table_rejected() {
        let contents = r#"
[[well_clas]]
code = "X"
description = "X"
"#;
        assert!(matches!(
            parse_code_tables(contents),
            Err(CodeFileError::UnknownTable(name)) if name == "well_clas"
        ));
    }

    #[test]
    fn test_expiry_dates_parse() {
        let contents = r#"
[[casing_material]]
code = "ASBESTOS"
description = "Asbestos cement"
effective_date = "1970-01-01"
expiry_date = "1990-01-01"
"#;
        let mut catalog = CodeCatalog::new();
        apply_code_tables(parse_code_tables(contents).unwrap(), &mut catalog).unwrap();
        let before = NaiveDate::from_ymd_opt(1985, 1, 1).unwrap();
        let after = NaiveDate::from_ymd_opt(1995, 1, 1).unwrap();
        assert!(catalog.active(CodeTableKind::CasingMaterial, before).contains("ASBESTOS"));
        assert!(!catalog.active(CodeTableKind::CasingMaterial, after).contains("ASBESTOS"));
    }

    #[test]
    fn test_load_merges_over_base() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codes.toml");
        std::fs::write(
            &path,
            r#"
[[well_subclass]]
code = "SEASONAL"
description = "Seasonal"
parent = "WATR_SPPLY"
"#,
        )
        .unwrap();

        let mut base = crate::codes::seed::default_catalog().unwrap();
        let added = apply_code_tables(read_code_file(&path).unwrap(), &mut base).unwrap();
        assert_eq!(added, 1);
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(base
            .active(CodeTableKind::WellSubclass, as_of)
            .contains_under("SEASONAL", "WATR_SPPLY"));
    }
}
