use entry_range::{EditorConfig, statics};
use pretty_assertions::assert_eq;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[test]
fn loads_config_with_comments_and_defaults() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("editor.json5");
    std::fs::write(
        &path,
        "{\n  // ai goals\n  pageSize: 200,\n  searchCaseSensitive: true,\n}\n",
    )?;

    let config = EditorConfig::load_path(&path)?;
    assert_eq!(
        config,
        EditorConfig {
            page_size: statics::PAGE_SIZE_AI,
            commit_on_row_switch: false,
            search_case_sensitive: true,
        }
    );
    Ok(())
}

#[test]
fn missing_config_file_is_an_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let err = EditorConfig::load_path(&dir.path().join("nope.json5")).unwrap_err();
    assert!(format!("{err:#}").contains("nope.json5"));
    Ok(())
}
