use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const LOCK_FILE: &str = ".lock";

/// How long a writer waits for another process to finish
const DEFAULT_WAIT: Duration = Duration::from_secs(5);
const MAX_BACKOFF: Duration = Duration::from_millis(80);

/// Exclusive write lock on a board's data files.
///
/// Held for the whole read-modify-write of `cards.json` / `comments.json`, so
/// the TUI worker and CLI runs never interleave. The lock file stays on disk
/// and carries the pid of the current holder; the flock goes away with the
/// file handle.
#[derive(Debug)]
pub struct BoardLock {
    _file: File,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("board is busy: {path} is held by {}", describe_holder(.holder))]
    Busy { path: PathBuf, holder: Option<u32> },
}

fn describe_holder(holder: &Option<u32>) -> String {
    match holder {
        Some(pid) => format!("process {}", pid),
        None => "another process".to_string(),
    }
}

impl BoardLock {
    /// Lock the board, waiting up to five seconds
    pub fn acquire(board_dir: &Path) -> Result<Self, LockError> {
        Self::acquire_within(board_dir, DEFAULT_WAIT)
    }

    pub fn acquire_within(board_dir: &Path, wait: Duration) -> Result<Self, LockError> {
        let path = board_dir.join(LOCK_FILE);
        let open_err = |source| LockError::Open {
            path: path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(open_err)?;

        let start = Instant::now();
        let mut backoff = Duration::from_millis(5);
        while !try_lock(&file) {
            if start.elapsed() >= wait {
                return Err(LockError::Busy {
                    holder: read_holder(&mut file),
                    path,
                });
            }
            std::thread::sleep(backoff);
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }

        // Best effort: the pid only feeds the Busy message
        let _ = record_holder(&mut file);
        Ok(BoardLock { _file: file })
    }
}

fn record_holder(file: &mut File) -> std::io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    write!(file, "{}", std::process::id())?;
    file.flush()
}

fn read_holder(file: &mut File) -> Option<u32> {
    let mut text = String::new();
    file.seek(SeekFrom::Start(0)).ok()?;
    file.read_to_string(&mut text).ok()?;
    text.trim().parse().ok()
}

/// Non-blocking exclusive flock; false when someone else holds it
#[cfg(unix)]
fn try_lock(file: &File) -> bool {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) == 0 }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> bool {
    true
}
