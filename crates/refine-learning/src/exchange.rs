//! Scoped exchange files shared with an external ranker.
//!
//! Every ranker invocation gets its own temporary directory. A successful invocation removes it
//! with [`Exchange::close`], which reports removal failures. On error paths the directory is
//! removed when the [`Exchange`] is dropped.

use std::{
    env, fs,
    fs::File,
    io,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use tempfile::TempDir;

use crate::LearningError;

/// A per-invocation scratch directory.
#[derive(Debug)]
pub struct Exchange {
    /// The directory, removed by `close` or on drop.
    dir: TempDir,
}

impl Exchange {
    /// Creates a fresh directory under the system temporary directory.
    pub fn new() -> Result<Self, LearningError> {
        let dir = tempfile::Builder::new()
            .prefix("refine-")
            .tempdir()
            .map_err(LearningError::io(env::temp_dir()))?;
        Ok(Self { dir })
    }

    /// Returns the path of `name` inside the directory.
    pub fn path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Creates `name`, fills it with `fill`, and returns its path.
    pub fn write(
        &self,
        name: impl AsRef<Path>,
        fill: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>,
    ) -> Result<PathBuf, LearningError> {
        let path = self.path(name);
        let file = File::create(&path).map_err(LearningError::io(&path))?;
        let mut writer = BufWriter::new(file);
        fill(&mut writer)
            .and_then(|()| writer.flush())
            .map_err(LearningError::io(&path))?;
        Ok(path)
    }

    /// Removes the directory and everything in it.
    pub fn close(self) -> Result<(), LearningError> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(LearningError::io(path))
    }
}

/// Reads one score per line from `path`, skipping blank lines.
pub fn read_scores(path: &Path) -> Result<Vec<f64>, LearningError> {
    let text = fs::read_to_string(path).map_err(LearningError::io(path))?;
    let mut scores = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let malformed = || LearningError::MalformedScore {
            path: path.to_path_buf(),
            line: i + 1,
            text: line.to_string(),
        };
        let score: f64 = trimmed.parse().map_err(|_| malformed())?;
        if score.is_nan() {
            return Err(malformed());
        }
        scores.push(score);
    }
    Ok(scores)
}

/// Returns the index of the highest of `scores`, which must hold one score per candidate.
///
/// Ties go to the earliest candidate.
pub fn best_index(scores: &[f64], candidates: usize) -> Result<usize, LearningError> {
    if candidates == 0 {
        return Err(LearningError::EmptyBatch);
    }
    if scores.len() != candidates {
        return Err(LearningError::ScoreCount {
            expected: candidates,
            found: scores.len(),
        });
    }
    let mut best = 0;
    for (i, score) in scores.iter().enumerate().skip(1) {
        if *score > scores[best] {
            best = i;
        }
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_is_removed_on_drop() {
        let exchange = Exchange::new().unwrap();
        let path = exchange
            .write("features", |w| writeln!(w, "1:0.5"))
            .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "1:0.5\n");
        drop(exchange);
        assert!(!path.exists());
    }

    #[test]
    fn close_removes_the_directory() {
        let exchange = Exchange::new().unwrap();
        let path = exchange.write("scores", |w| writeln!(w, "1")).unwrap();
        exchange.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn close_reports_removal_failure() {
        let exchange = Exchange::new().unwrap();
        let dir = exchange.path("");
        fs::remove_dir_all(&dir).unwrap();
        match exchange.close().unwrap_err() {
            LearningError::Io { path, .. } => assert_eq!(path, dir),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn exchanges_do_not_share_paths() {
        let a = Exchange::new().unwrap();
        let b = Exchange::new().unwrap();
        assert_ne!(a.path("features"), b.path("features"));
    }

    #[test]
    fn reads_scores_in_order() {
        let exchange = Exchange::new().unwrap();
        let path = exchange
            .write("scores", |w| w.write_all(b"0.5\n-1\n\n2.25\n"))
            .unwrap();
        assert_eq!(read_scores(&path).unwrap(), vec![0.5, -1.0, 2.25]);
    }

    #[test]
    fn malformed_score_names_the_line() {
        let exchange = Exchange::new().unwrap();
        let path = exchange
            .write("scores", |w| w.write_all(b"0.5\nabc\n"))
            .unwrap();
        let err = read_scores(&path).unwrap_err();
        match err {
            LearningError::MalformedScore { line, text, .. } => {
                assert_eq!(line, 2);
                assert_eq!(text, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_score_file_is_an_io_error() {
        let exchange = Exchange::new().unwrap();
        let err = read_scores(&exchange.path("absent")).unwrap_err();
        assert!(matches!(err, LearningError::Io { .. }));
    }

    #[test]
    fn best_index_prefers_first_on_ties() {
        assert_eq!(best_index(&[1.0, 3.0, 3.0, 2.0], 4).unwrap(), 1);
        assert_eq!(best_index(&[-1.0], 1).unwrap(), 0);
    }

    #[test]
    fn best_index_checks_counts() {
        assert!(matches!(best_index(&[], 0), Err(LearningError::EmptyBatch)));
        assert!(matches!(
            best_index(&[1.0], 2),
            Err(LearningError::ScoreCount {
                expected: 2,
                found: 1
            })
        ));
    }
}
