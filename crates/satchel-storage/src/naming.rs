//! Object naming and path sharding.
//!
//! Every new object gets a collision-resistant generated name and a
//! `{year}/{month}/{file_name}` relative path. Year/month sharding bounds
//! directory fan-out so no single directory grows unbounded as uploads
//! accumulate. Generation is centralized here so all backends agree on
//! the layout.

use chrono::{DateTime, Datelike, Utc};
use std::path::Path;
use uuid::Uuid;

/// Prefix for generated file names. Human-irrelevant; exists so generated
/// names are recognizable next to anything else in a shard directory.
const FILE_PREFIX: &str = "att-";

/// Generated identity of a new object: the file name and the sharded
/// relative path it will live under on every backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectName {
    pub file_name: String,
    pub relative_path: String,
}

impl ObjectName {
    /// Assign a name and relative path for a new object.
    ///
    /// The file name is `att-{token}` plus the original extension when one
    /// is present, so downstream HTTP serving negotiates content correctly.
    /// No I/O and no failure mode.
    pub fn assign(original_name: &str, now: DateTime<Utc>) -> Self {
        let token = Uuid::new_v4().simple().to_string();
        let file_name = match Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(ext) if !ext.is_empty() => format!("{}{}.{}", FILE_PREFIX, token, ext),
            _ => format!("{}{}", FILE_PREFIX, token),
        };
        let relative_path = format!("{}/{:02}/{}", now.year(), now.month(), file_name);

        ObjectName {
            file_name,
            relative_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_extension_preserved() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
        let name = ObjectName::assign("report.pdf", now);
        assert!(name.file_name.starts_with("att-"));
        assert!(name.file_name.ends_with(".pdf"));
        assert_eq!(
            name.relative_path,
            format!("2026/01/{}", name.file_name)
        );
    }

    #[test]
    fn test_month_zero_padded() {
        let now = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
        let name = ObjectName::assign("photo.jpg", now);
        assert!(name.relative_path.starts_with("2025/09/"));
    }

    #[test]
    fn test_no_extension() {
        let now = Utc::now();
        let name = ObjectName::assign("README", now);
        assert!(!name.file_name.contains('.'));
    }

    #[test]
    fn test_names_distinct_for_identical_input() {
        let now = Utc::now();
        let a = ObjectName::assign("report.pdf", now);
        let b = ObjectName::assign("report.pdf", now);
        assert_ne!(a.file_name, b.file_name);
        assert_ne!(a.relative_path, b.relative_path);
    }
}
