//! Content hashing for catalogued files.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use blake3::Hasher;

use projsim_core::ContentHash;

/// Compute the BLAKE3 hash of a file with a buffered read.
pub fn hash_file(path: &Path) -> std::io::Result<ContentHash> {
    let mut file = File::open(path)?;
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; 64 * 1024];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(ContentHash::new(*hasher.finalize().as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_hash_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), "same content").unwrap();
        fs::write(temp.path().join("b.txt"), "same content").unwrap();
        fs::write(temp.path().join("c.txt"), "other content").unwrap();

        let a = hash_file(&temp.path().join("a.txt")).unwrap();
        let b = hash_file(&temp.path().join("b.txt")).unwrap();
        let c = hash_file(&temp.path().join("c.txt")).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.0, *blake3::hash(b"same content").as_bytes());
    }

    #[test]
    fn test_hash_missing_file() {
        let temp = TempDir::new().unwrap();
        assert!(hash_file(&temp.path().join("missing.txt")).is_err());
    }
}
