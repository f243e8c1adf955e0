//! Serde helpers that write paths as strings even when they are not UTF-8.
//!
//! serde refuses to serialize a `Path` that is not valid UTF-8. Reports use
//! these through `#[serde(with = "...")]` so such paths come out with U+FFFD
//! replacement characters instead of failing the whole document.

/// `PathBuf` fields.
pub mod lossy {
    use std::path::{Path, PathBuf};

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(path: &Path, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&path.to_string_lossy())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
    where
        D: Deserializer<'de>,
    {
        PathBuf::deserialize(deserializer)
    }
}

/// `Option<PathBuf>` fields.
pub mod lossy_option {
    use std::path::PathBuf;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(path: &Option<PathBuf>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match path {
            Some(path) => serializer.serialize_some(&path.to_string_lossy()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<PathBuf>::deserialize(deserializer)
    }
}

/// `Vec<PathBuf>` fields.
pub mod lossy_vec {
    use std::path::PathBuf;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(paths: &[PathBuf], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(paths.iter().map(|path| path.to_string_lossy()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<PathBuf>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<PathBuf>::deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;
    use std::path::PathBuf;

    #[derive(Serialize)]
    struct Paths {
        #[serde(with = "super::lossy")]
        one: PathBuf,
        #[serde(with = "super::lossy_option")]
        maybe: Option<PathBuf>,
        #[serde(with = "super::lossy_vec")]
        many: Vec<PathBuf>,
    }

    #[test]
    fn test_utf8_paths_unchanged() {
        let paths = Paths {
            one: PathBuf::from("/data/a.txt"),
            maybe: None,
            many: vec![PathBuf::from("/x"), PathBuf::from("/y")],
        };
        let json = serde_json::to_value(&paths).unwrap();
        assert_eq!(json["one"], "/data/a.txt");
        assert!(json["maybe"].is_null());
        assert_eq!(json["many"][1], "/y");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_paths_are_replaced() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let odd = PathBuf::from(OsStr::from_bytes(b"/data/caf\xe9.bin"));
        let paths = Paths {
            one: odd.clone(),
            maybe: Some(odd.clone()),
            many: vec![odd],
        };
        let json = serde_json::to_value(&paths).unwrap();
        assert_eq!(json["one"], "/data/caf\u{FFFD}.bin");
        assert_eq!(json["maybe"], "/data/caf\u{FFFD}.bin");
        assert_eq!(json["many"][0], "/data/caf\u{FFFD}.bin");
    }
}
