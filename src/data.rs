use std::fs::File;
use std::io::{prelude::*, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

/// Read a word list: one word per line, only the first tab separated column
/// counts. Blank lines and `#` comments are skipped.
pub fn read_words(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut words = vec![];
    for (i, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {} of {}", i + 1, path.display()))?;
        let word = line.split('\t').next().unwrap_or_default().trim();
        if word.is_empty() || word.starts_with('#') {
            continue;
        }
        words.push(word.to_string());
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_extra_columns() {
        let path = std::env::temp_dir().join(format!("entropybot-words-{}.tsv", std::process::id()));
        std::fs::write(&path, "# answers\ncrane\t0.9\n\n  slate \ntrace\t0.1\textra\n").unwrap();
        let words = read_words(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(words, ["crane", "slate", "trace"]);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_words(Path::new("/nonexistent/words.txt")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/words.txt"));
    }
}
