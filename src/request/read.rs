use std::{fs, io};
use std::io::Error;
use std::path::{Path, PathBuf};

/// List job request messages in a directory, sorted by file name.
///
/// Only `*.json` entries are returned. Message directories on shared
/// filesystems collect editor backups and `.nfs*` droppings, none of which
/// are job requests.
pub fn get_message_paths(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut paths = fs::read_dir(dir)?
        .map(|res| res.map(|e| e.path()))
        .collect::<Result<Vec<PathBuf>, io::Error>>()?;

    paths.retain(|p| p.extension().map_or(false, |ext| ext == "json"));
    paths.sort();

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn only_json_messages_are_returned_in_order() {
        let dir = tempfile::tempdir().expect("temp dir");
        for name in ["b.json", "a.json", "notes.txt", "stale.json.bak"] {
            File::create(dir.path().join(name)).expect("create file");
        }

        let paths = get_message_paths(dir.path()).expect("readable dir");
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        assert_eq!(names, vec!["a.json", "b.json"]);
    }
}
