use crate::statics;
use anyhow::{Context, ensure};
use serde::Deserialize;
use std::{fs, path::Path};

/// Per-editor behavior, created once by the host and handed to each controller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Rows per page.
    pub page_size: usize,
    /// When another row is selected while an edit is open: commit it (`true`)
    /// or discard it (`false`).
    pub commit_on_row_switch: bool,
    pub search_case_sensitive: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            page_size: statics::PAGE_SIZE_DEFAULT,
            commit_on_row_switch: false,
            search_case_sensitive: false,
        }
    }
}

impl EditorConfig {
    /// Params tables: large pages, edits are silently kept on row switch.
    pub fn params() -> Self {
        Self {
            page_size: statics::PAGE_SIZE_PARAMS,
            commit_on_row_switch: true,
            ..Self::default()
        }
    }

    /// AI goal scripts: unsaved edits must be resolved by the user.
    pub fn ai() -> Self {
        Self {
            page_size: statics::PAGE_SIZE_AI,
            commit_on_row_switch: false,
            ..Self::default()
        }
    }

    pub fn maps() -> Self {
        Self {
            page_size: statics::PAGE_SIZE_MAPS,
            ..Self::default()
        }
    }

    pub fn from_json5(text: &str) -> anyhow::Result<Self> {
        let config: Self = json5::from_str(text).context("parsing editor config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_path(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
        Self::from_json5(&text).with_context(|| format!("loading {path:?}"))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.page_size > 0, "pageSize must be at least 1");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::EditorConfig;
    use crate::statics;

    #[test]
    fn missing_fields_use_defaults() {
        let config = EditorConfig::from_json5("{ commitOnRowSwitch: true, }").unwrap();
        assert_eq!(config.page_size, statics::PAGE_SIZE_DEFAULT);
        assert!(config.commit_on_row_switch);
        assert!(!config.search_case_sensitive);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = EditorConfig::from_json5("{ pageSize: 0 }").unwrap_err();
        assert!(format!("{err:#}").contains("pageSize"));
    }

    #[test]
    fn presets_differ_in_row_switch_policy() {
        assert!(EditorConfig::params().commit_on_row_switch);
        assert!(!EditorConfig::ai().commit_on_row_switch);
        assert_eq!(EditorConfig::ai().page_size, 200);
        assert_eq!(EditorConfig::maps().page_size, 10);
    }
}
