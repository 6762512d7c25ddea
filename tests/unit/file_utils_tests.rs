/*!
 * Tests for file utility functions
 */

use std::path::PathBuf;

use doctrans::file_utils::FileManager;

use crate::common::{create_temp_dir, create_test_file};

#[test]
fn test_translatedOutputPath_withExtension_shouldAppendSuffixToStem() {
    let output = FileManager::translated_output_path("docs/paper.md");
    assert_eq!(output, PathBuf::from("docs/paper-translated.md"));
}

#[test]
fn test_translatedOutputPath_withoutExtension_shouldAppendSuffix() {
    let output = FileManager::translated_output_path("notes");
    assert_eq!(output, PathBuf::from("notes-translated"));
}

#[test]
fn test_translatedOutputPath_withMultipleDots_shouldKeepLastExtension() {
    let output = FileManager::translated_output_path("archive.tar.gz");
    assert_eq!(output, PathBuf::from("archive.tar-translated.gz"));
}

#[test]
fn test_fileExists_withRealAndMissingFiles_shouldDetectCorrectly() {
    let dir = create_temp_dir().unwrap();
    let file = create_test_file(&dir.path().to_path_buf(), "input.txt", "content").unwrap();

    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::file_exists(dir.path().join("missing.txt")));
    // A directory is not a file
    assert!(!FileManager::file_exists(dir.path()));
}

#[test]
fn test_readToString_withUtf8Content_shouldRoundTrip() {
    let dir = create_temp_dir().unwrap();
    let content = "Héllo 世界\n\nSecond paragraph.";
    let file = create_test_file(&dir.path().to_path_buf(), "input.txt", content).unwrap();

    assert_eq!(FileManager::read_to_string(&file).unwrap(), content);
}

#[test]
fn test_readToString_withMissingFile_shouldFail() {
    assert!(FileManager::read_to_string("definitely/not/here.txt").is_err());
}

#[test]
fn test_writeToFile_shouldCreateFile() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("out.txt");

    FileManager::write_to_file(&path, "written").unwrap();
    assert_eq!(FileManager::read_to_string(&path).unwrap(), "written");
}
