//! External ranker invocation.

use std::{
    ffi::OsString,
    io,
    io::{BufRead, BufReader, Read},
    path::Path,
    process::{Command, Stdio},
    thread,
};

use log::{debug, warn};

use crate::LearningError;

/// Runs `binary` with `args` to completion.
///
/// Standard output is logged at `debug` and standard error at `warn`, line by line, while the
/// process runs. A non-zero exit status is an error.
pub fn run(binary: &Path, args: &[OsString]) -> Result<(), LearningError> {
    debug!("running {} {args:?}", binary.display());

    let launch_error = |source| LearningError::Launch {
        binary: binary.to_path_buf(),
        source,
    };

    let mut child = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(launch_error)?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let name = binary.display().to_string();
    let name = name.as_str();

    thread::scope(|s| {
        if let Some(out) = stdout {
            s.spawn(move || drain(name, out, |line| debug!("{name}: {line}")));
        }
        if let Some(err) = stderr {
            s.spawn(move || drain(name, err, |line| warn!("{name}: {line}")));
        }
    });

    let status = child.wait().map_err(launch_error)?;
    if status.success() {
        Ok(())
    } else {
        Err(LearningError::Exit {
            binary: binary.to_path_buf(),
            status,
        })
    }
}

/// Reads `reader` to the end, passing each line to `log_line`.
///
/// After a read error the rest of the stream is discarded unlogged, so the child never blocks
/// on a full pipe.
fn drain(name: &str, reader: impl Read, log_line: impl Fn(&str)) {
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => return,
            Ok(_) => {
                let text = String::from_utf8_lossy(&line);
                let text = text.trim_end();
                if !text.is_empty() {
                    log_line(text);
                }
            }
            Err(e) => {
                warn!("{name}: unreadable output, discarding the rest: {e}");
                if let Err(e) = io::copy(&mut reader, &mut io::sink()) {
                    warn!("{name}: {e}");
                }
                return;
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    fn sh(script: &str) -> Result<(), LearningError> {
        run(Path::new("sh"), &["-c".into(), script.into()])
    }

    #[test]
    fn success_with_output() {
        sh("echo out; echo err >&2").unwrap();
    }

    #[test]
    fn non_zero_exit_is_an_error() {
        let err = sh("exit 3").unwrap_err();
        match err {
            LearningError::Exit { status, .. } => assert_eq!(status.code(), Some(3)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_binary_is_a_launch_error() {
        let err = run(Path::new("/nonexistent/ranker"), &[]).unwrap_err();
        assert!(matches!(err, LearningError::Launch { .. }));
        assert!(err.is_transient());
    }

    /// Fails its first read, then yields `data`.
    struct FlakyReader {
        failed: bool,
        data: io::Cursor<Vec<u8>>,
    }

    impl Read for FlakyReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.failed {
                self.failed = true;
                return Err(io::Error::other("broken pipe"));
            }
            self.data.read(buf)
        }
    }

    #[test]
    fn read_error_still_consumes_the_stream() {
        let mut reader = FlakyReader {
            failed: false,
            data: io::Cursor::new(b"one\ntwo\n".repeat(10_000)),
        };
        let lines = Cell::new(0);
        drain("ranker", &mut reader, |_| lines.set(lines.get() + 1));
        assert!(reader.failed);
        assert_eq!(reader.data.position(), 80_000);
        assert_eq!(lines.get(), 0);
    }

    #[test]
    fn invalid_utf8_lines_are_logged_lossily() {
        let lines = RefCell::new(Vec::new());
        drain("ranker", &b"ok\n\xff\xfe bad\nlast"[..], |line| {
            lines.borrow_mut().push(line.to_string());
        });
        assert_eq!(
            lines.into_inner(),
            vec!["ok".to_string(), "\u{fffd}\u{fffd} bad".to_string(), "last".to_string()]
        );
    }

    #[test]
    fn large_output_does_not_block() {
        sh("i=0; while [ $i -lt 20000 ]; do echo line $i; echo err $i >&2; i=$((i+1)); done")
            .unwrap();
    }
}
