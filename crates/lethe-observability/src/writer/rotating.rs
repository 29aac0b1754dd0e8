use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Appends to `path`, rotating to `path.1`, `path.2`, … once the live file
/// would exceed `max_bytes`. At most `max_generations` rotated files are
/// kept; older ones are deleted.
///
/// `&RotatingFileWriter` implements [`Write`], so an `Arc` of it can be
/// handed to `tracing_subscriber` as a `MakeWriter`.
#[derive(Debug)]
pub struct RotatingFileWriter {
    path: PathBuf,
    max_bytes: u64,
    max_generations: usize,
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    file: Option<File>,
    size: u64,
}

impl RotatingFileWriter {
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, max_generations: usize) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = open_append(&path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            path,
            max_bytes: max_bytes.max(1),
            max_generations,
            state: Mutex::new(State {
                file: Some(file),
                size,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of rotated generation `n` (1 is the most recent).
    pub fn generation_path(&self, n: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{n}"));
        PathBuf::from(name)
    }

    /// Write one record and a trailing newline. Records are never split
    /// across files.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');
        self.write_record(&buf)
    }

    fn write_record(&self, buf: &[u8]) -> io::Result<()> {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let state = &mut *guard;
        if state.size > 0 && state.size + buf.len() as u64 > self.max_bytes {
            self.rotate(state)?;
        }
        if state.file.is_none() {
            let f = open_append(&self.path)?;
            state.size = f.metadata()?.len();
            state.file = Some(f);
        }
        if let Some(file) = state.file.as_mut() {
            file.write_all(buf)?;
            state.size += buf.len() as u64;
        }
        Ok(())
    }

    fn rotate(&self, state: &mut State) -> io::Result<()> {
        if let Some(mut f) = state.file.take() {
            f.flush()?;
        }
        if self.max_generations == 0 {
            fs::remove_file(&self.path).or_else(ignore_missing)?;
        } else {
            fs::remove_file(self.generation_path(self.max_generations)).or_else(ignore_missing)?;
            for n in (1..self.max_generations).rev() {
                let from = self.generation_path(n);
                if from.exists() {
                    fs::rename(&from, self.generation_path(n + 1))?;
                }
            }
            fs::rename(&self.path, self.generation_path(1)).or_else(ignore_missing)?;
        }
        state.file = Some(open_append(&self.path)?);
        state.size = 0;
        Ok(())
    }
}

impl Write for &RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_record(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.file.as_mut() {
            Some(f) => f.flush(),
            None => Ok(()),
        }
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn ignore_missing(e: io::Error) -> io::Result<()> {
    if e.kind() == io::ErrorKind::NotFound {
        Ok(())
    } else {
        Err(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotates_and_bounds_generations() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RotatingFileWriter::open(dir.path().join("a.log"), 20, 2).unwrap();
        for i in 0..10 {
            writer.write_line(&format!("line-{i:02}-xxxxx")).unwrap();
        }
        assert!(writer.path().exists());
        assert!(writer.generation_path(1).exists());
        assert!(writer.generation_path(2).exists());
        assert!(!writer.generation_path(3).exists());

        let live = fs::read_to_string(writer.path()).unwrap();
        assert_eq!(live, "line-09-xxxxx\n");
        let newest = fs::read_to_string(writer.generation_path(1)).unwrap();
        assert_eq!(newest, "line-08-xxxxx\n");
    }

    #[test]
    fn zero_generations_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RotatingFileWriter::open(dir.path().join("b.log"), 10, 0).unwrap();
        writer.write_line("first-record").unwrap();
        writer.write_line("second-record").unwrap();
        assert!(!writer.generation_path(1).exists());
        assert_eq!(
            fs::read_to_string(writer.path()).unwrap(),
            "second-record\n"
        );
    }

    #[test]
    fn appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.log");
        fs::write(&path, "old\n").unwrap();
        let writer = RotatingFileWriter::open(&path, 1024, 1).unwrap();
        writer.write_line("new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "old\nnew\n");
    }
}
