pub mod chsh;
pub mod clean;
pub mod report;
pub mod run;
pub mod stage;

use bellhome_core::{DirStore, Party, Result};

/// Parse a `--device` value into a party (case-insensitive).
pub fn parse_device(s: &str) -> Result<Party> {
    s.parse()
}

/// Open the data directory, creating it if needed.
pub fn open_store(dir: &str) -> Result<DirStore> {
    DirStore::open(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bellhome_core::BellError;

    #[test]
    fn test_parse_device_variants() {
        assert_eq!(parse_device("alice").unwrap(), Party::Alice);
        assert_eq!(parse_device("ALICE").unwrap(), Party::Alice);
        assert_eq!(parse_device("Bob").unwrap(), Party::Bob);
    }

    #[test]
    fn test_parse_device_unknown() {
        assert!(matches!(
            parse_device("eve"),
            Err(BellError::UnknownParty(_))
        ));
    }

    #[test]
    fn test_open_store_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("data");
        let store = open_store(dir.to_str().unwrap()).unwrap();
        assert!(store.dir().is_dir());
    }
}
