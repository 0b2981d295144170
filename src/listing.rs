//! Plain-text rendering of a file listing.

use std::io::{self, Write};

use crate::models::FileMetadata;

/// Write the `Files:` header followed by one `<name> (<id>)` line per file,
/// in the order given.
pub fn write_listing<W: Write>(out: &mut W, files: &[FileMetadata]) -> io::Result<()> {
    writeln!(out, "Files:")?;
    if files.is_empty() {
        writeln!(out, "No files found.")?;
    } else {
        for file in files {
            writeln!(out, "{}", file)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(files: &[FileMetadata]) -> String {
        let mut out = Vec::new();
        write_listing(&mut out, files).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_listing() {
        assert_eq!(render(&[]), "Files:\nNo files found.\n");
    }

    #[test]
    fn test_listing_keeps_order() {
        let files = vec![
            FileMetadata {
                id: "2".to_string(),
                name: "b.txt".to_string(),
            },
            FileMetadata {
                id: "1".to_string(),
                name: "a.txt".to_string(),
            },
        ];
        assert_eq!(render(&files), "Files:\nb.txt (2)\na.txt (1)\n");
    }
}
