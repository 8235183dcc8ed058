//! Class label tables mapping output positions to names.

use std::path::Path;

use lazy_static::lazy_static;

use crate::error::{ClassifyError, Result};

/// Number of classes in the ImageNet (ILSVRC-2012) label set.
pub const IMAGENET_CLASS_COUNT: usize = 1000;

static IMAGENET_CLASSES_TXT: &str = include_str!("../assets/imagenet_classes.txt");

lazy_static! {
    static ref IMAGENET: ClassLabelTable = ClassLabelTable::parse(IMAGENET_CLASSES_TXT);
}

/// Ordered labels, indexed 1:1 by the position of a score in the model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLabelTable {
    labels: Vec<String>,
}

impl ClassLabelTable {
    /// The embedded 1000-class ImageNet table.
    pub fn imagenet() -> &'static ClassLabelTable {
        &IMAGENET
    }

    /// Build a table from labels in output order.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Load a newline-separated label file (one label per line).
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let table = Self::parse(&content);
        if table.is_empty() {
            return Err(ClassifyError::Config(format!(
                "label file {} contains no labels",
                path.display()
            )));
        }
        Ok(table)
    }

    fn parse(content: &str) -> Self {
        Self::from_labels(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        )
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label at an output position.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Case-insensitive substring search, returning `(index, label)` pairs.
    pub fn search<'a>(&'a self, needle: &str) -> Vec<(usize, &'a str)> {
        let needle = needle.to_lowercase();
        self.iter()
            .enumerate()
            .filter(|(_, label)| label.to_lowercase().contains(&needle))
            .collect()
    }

    /// Fail unless a model output of `outputs` scores lines up with this table.
    pub fn check_output_len(&self, outputs: usize) -> Result<()> {
        if outputs != self.len() {
            return Err(ClassifyError::LabelTableMismatch {
                labels: self.len(),
                outputs,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_imagenet_table_size() {
        let table = ClassLabelTable::imagenet();
        assert_eq!(table.len(), IMAGENET_CLASS_COUNT);
    }

    #[test]
    fn test_imagenet_known_indices() {
        let table = ClassLabelTable::imagenet();
        assert_eq!(table.get(0), Some("tench"));
        assert_eq!(table.get(207), Some("golden retriever"));
        assert_eq!(table.get(281), Some("tabby"));
        assert_eq!(table.get(999), Some("toilet tissue"));
        assert_eq!(table.get(1000), None);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let table = ClassLabelTable::from_labels(["cat", "Dog", "hot dog"]);
        assert_eq!(table.search("DOG"), vec![(1, "Dog"), (2, "hot dog")]);
    }

    #[test]
    fn test_check_output_len() {
        let table = ClassLabelTable::from_labels(["cat", "dog", "bird"]);
        assert!(table.check_output_len(3).is_ok());

        let err = table.check_output_len(4).unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::LabelTableMismatch { labels: 3, outputs: 4 }
        ));
        assert!(table.check_output_len(2).is_err());
    }

    #[test]
    fn test_from_file_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        std::fs::write(&path, "cat\n\n  dog  \nbird\n").unwrap();

        let table = ClassLabelTable::from_file(&path).unwrap();
        assert_eq!(table.iter().collect::<Vec<_>>(), vec!["cat", "dog", "bird"]);
    }

    #[test]
    fn test_from_file_rejects_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        std::fs::write(&path, "\n\n").unwrap();

        assert!(matches!(
            ClassLabelTable::from_file(&path),
            Err(ClassifyError::Config(_))
        ));
    }
}
