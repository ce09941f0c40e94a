//! Packaging the exploded application directory.

use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{DeployError, DeployResult};

/// Name of the settings file the server loads at startup.
pub const PROPERTIES_FILE: &str = ".env";

/// Write deployment settings into `app_dir` as a `.env` file.
///
/// Values are single-quoted so the server reads them literally.
///
/// # Errors
///
/// Returns [`DeployError::InvalidArgument`] for a key that is not a valid
/// variable name or a value containing a single quote or newline.
pub fn write_properties(app_dir: &Path, props: &BTreeMap<String, String>) -> DeployResult<PathBuf> {
    let mut contents = String::from("# tweetstore deployment settings\n");
    for (key, value) in props {
        let valid_key = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        if !valid_key {
            return Err(DeployError::InvalidArgument(format!(
                "property name '{key}'"
            )));
        }
        if value.contains(['\'', '\n', '\r']) {
            return Err(DeployError::InvalidArgument(format!(
                "property '{key}' has a value that cannot be quoted"
            )));
        }
        contents.push_str(&format!("{key}='{value}'\n"));
    }

    let path = app_dir.join(PROPERTIES_FILE);
    std::fs::write(&path, contents)?;
    info!(path = %path.display(), count = props.len(), "Wrote deployment properties");
    Ok(path)
}

/// Zip `dir` into a sibling archive named `<dir>-<platform>.zip`.
///
/// The directory is canonicalized first, so `.` or a trailing slash still
/// place the archive next to the directory rather than inside it.
///
/// # Errors
///
/// Returns an error if `dir` is not a directory or the archive cannot be written.
pub fn zip_dir(dir: &Path, platform: &str) -> DeployResult<PathBuf> {
    if !dir.is_dir() {
        return Err(DeployError::InvalidArgument(format!(
            "'{}' is not a directory",
            dir.display()
        )));
    }

    let dir = dir.canonicalize()?;
    let (Some(name), Some(parent)) = (dir.file_name(), dir.parent()) else {
        return Err(DeployError::InvalidArgument(format!(
            "'{}' has no parent directory",
            dir.display()
        )));
    };
    let archive = parent.join(format!("{}-{platform}.zip", name.to_string_lossy()));

    let mut writer = ZipWriter::new(File::create(&archive)?);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let entries = add_dir(&mut writer, &dir, "", &archive, options)?;
    writer.finish()?;

    info!(archive = %archive.display(), entries, "Packaged application");
    Ok(archive)
}

/// Recursively add the contents of `dir` under `prefix`, leaving out `skip`.
/// Returns the number of files.
fn add_dir(
    writer: &mut ZipWriter<File>,
    dir: &Path,
    prefix: &str,
    skip: &Path,
    options: FileOptions,
) -> DeployResult<usize> {
    let mut children = std::fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    children.sort_by_key(std::fs::DirEntry::file_name);

    let mut files = 0;
    for child in children {
        let path = child.path();
        if path == skip {
            continue;
        }
        let name = format!("{prefix}{}", child.file_name().to_string_lossy());
        if child.file_type()?.is_dir() {
            writer.add_directory(format!("{name}/"), options)?;
            files += add_dir(writer, &path, &format!("{name}/"), skip, options)?;
        } else {
            debug!(entry = %name, "Adding file");
            writer.start_file(name, options)?;
            io::copy(&mut File::open(&path)?, writer)?;
            files += 1;
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Read;

    fn read_entry(archive: &Path, name: &str) -> String {
        let mut zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
        let mut entry = zip.by_name(name).unwrap();
        let mut contents = String::new();
        entry.read_to_string(&mut contents).unwrap();
        contents
    }

    #[test]
    fn test_write_properties() {
        let dir = tempfile::tempdir().unwrap();
        let props = BTreeMap::from([
            ("TWEETSTORE__STORE__CONTAINER".to_string(), "jclouds-tweets".to_string()),
            ("TWEETSTORE__STORE__BLOBSTORES".to_string(), "aws-s3, azureblob".to_string()),
        ]);

        let path = write_properties(dir.path(), &props).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(
            contents,
            "# tweetstore deployment settings\n\
             TWEETSTORE__STORE__BLOBSTORES='aws-s3, azureblob'\n\
             TWEETSTORE__STORE__CONTAINER='jclouds-tweets'\n"
        );
    }

    #[test]
    fn test_write_properties_rejects_unquotable_values() {
        let dir = tempfile::tempdir().unwrap();
        let props = BTreeMap::from([("KEY".to_string(), "it's".to_string())]);
        assert!(matches!(
            write_properties(dir.path(), &props),
            Err(DeployError::InvalidArgument(_))
        ));

        let props = BTreeMap::from([("BAD KEY".to_string(), "v".to_string())]);
        assert!(write_properties(dir.path(), &props).is_err());
    }

    #[test]
    fn test_zip_dir_names_and_contents() {
        let root = tempfile::tempdir().unwrap();
        let app = root.path().join("tweetstore");
        std::fs::create_dir_all(app.join("static/css")).unwrap();
        std::fs::write(app.join(".env"), "KEY='v'\n").unwrap();
        std::fs::write(app.join("static/css/site.css"), "body {}").unwrap();

        let archive = zip_dir(&app, "cloudfoundry").unwrap();
        assert_eq!(
            archive,
            root.path().canonicalize().unwrap().join("tweetstore-cloudfoundry.zip")
        );

        let zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let mut names: Vec<&str> = zip.file_names().collect();
        names.sort_unstable();
        assert_eq!(
            names,
            vec![".env", "static/", "static/css/", "static/css/site.css"]
        );
        assert_eq!(read_entry(&archive, "static/css/site.css"), "body {}");
    }

    #[test]
    fn test_zip_dir_requires_directory() {
        let root = tempfile::tempdir().unwrap();
        let err = zip_dir(&root.path().join("missing"), "cloudbees").unwrap_err();
        assert!(matches!(err, DeployError::InvalidArgument(_)));
    }

    #[rstest]
    #[case::trailing_slash("tweetstore/")]
    #[case::current_dir("tweetstore/.")]
    #[case::parent_segment("tweetstore/static/..")]
    fn test_zip_dir_archive_lands_beside_directory(#[case] relative: &str) {
        let root = tempfile::tempdir().unwrap();
        let app = root.path().join("tweetstore");
        std::fs::create_dir_all(app.join("static")).unwrap();
        std::fs::write(app.join("index.html"), "<html></html>").unwrap();

        let archive = zip_dir(&root.path().join(relative), "cloudbees").unwrap();

        assert_eq!(
            archive,
            root.path().canonicalize().unwrap().join("tweetstore-cloudbees.zip")
        );
        assert!(!app.canonicalize().unwrap().join("-cloudbees.zip").exists());
        let zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let mut names: Vec<&str> = zip.file_names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["index.html", "static/"]);
    }

    #[test]
    fn test_add_dir_skips_archive_inside_directory() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("index.html"), "<html></html>").unwrap();
        let out = tempfile::tempdir().unwrap();
        let skip = root.path().join("app.zip");
        std::fs::write(&skip, "partial").unwrap();

        let target = out.path().join("out.zip");
        let mut writer = ZipWriter::new(File::create(&target).unwrap());
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let files = add_dir(&mut writer, root.path(), "", &skip, options).unwrap();
        writer.finish().unwrap();

        assert_eq!(files, 1);
        let zip = zip::ZipArchive::new(File::open(&target).unwrap()).unwrap();
        assert_eq!(zip.file_names().collect::<Vec<_>>(), vec!["index.html"]);
    }
}
