//! src/file_splitter.rs
use crate::functions::MapInput;
use anyhow::Context;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A line-aligned byte range of one input file, processed by a single mapper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputSplit {
    id: Uuid,
    path: PathBuf,
    offset: u64,
    length: u64,
}

impl InputSplit {
    pub fn new(path: impl Into<PathBuf>, offset: u64, length: u64) -> Self {
        InputSplit {
            id: Uuid::new_v4(),
            path: path.into(),
            offset,
            length,
        }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// Opens the split and yields its records, keyed by byte offset in the file.
    pub fn records(&self) -> Result<impl Iterator<Item = io::Result<MapInput>>, anyhow::Error> {
        let mut file = File::open(&self.path)
            .with_context(|| format!("Failed to open input file: {}", self.path.display()))?;
        file.seek(SeekFrom::Start(self.offset))
            .context("Failed to seek to split offset")?;
        let reader = BufReader::new(file.take(self.length));
        Ok(LossyLines::new(reader, self.offset)
            .map(|line| line.map(|(offset, value)| MapInput::new(offset, value))))
    }
}

/// Reads lines ended by `\n`, `\r\n` or a lone `\r`, decoding invalid UTF-8 lossily.
pub struct LossyLines<R> {
    reader: R,
    offset: u64,
    buf: Vec<u8>,
    after_cr: bool,
}

impl<R: BufRead> LossyLines<R> {
    pub fn new(reader: R, offset: u64) -> Self {
        LossyLines {
            reader,
            offset,
            buf: Vec::new(),
            after_cr: false,
        }
    }

    /// Swallows the `\n` of a `\r\n` pair split across two reads.
    fn skip_pending_lf(&mut self) -> io::Result<()> {
        if !self.after_cr {
            return Ok(());
        }
        self.after_cr = false;
        let lf = self.reader.fill_buf()?.first() == Some(&b'\n');
        if lf {
            self.reader.consume(1);
            self.offset += 1;
        }
        Ok(())
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = io::Result<(u64, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(e) = self.skip_pending_lf() {
            return Some(Err(e));
        }
        self.buf.clear();
        let start = self.offset;
        let mut terminated = false;
        while !terminated {
            let bytes = match self.reader.fill_buf() {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Some(Err(e)),
            };
            if bytes.is_empty() {
                break;
            }
            let used = match bytes.iter().position(|b| *b == b'\n' || *b == b'\r') {
                Some(i) => {
                    self.buf.extend_from_slice(&bytes[..i]);
                    self.after_cr = bytes[i] == b'\r';
                    terminated = true;
                    i + 1
                }
                None => {
                    self.buf.extend_from_slice(bytes);
                    bytes.len()
                }
            };
            self.reader.consume(used);
            self.offset += used as u64;
        }
        if !terminated && self.buf.is_empty() {
            return None;
        }
        Some(Ok((start, String::from_utf8_lossy(&self.buf).into_owned())))
    }
}

pub struct FileSplitter {
    path: PathBuf,
    split_size_in_bytes: u64,
}

impl FileSplitter {
    pub fn new(path: impl Into<PathBuf>, split_size_in_bytes: u64) -> Self {
        FileSplitter {
            path: path.into(),
            split_size_in_bytes,
        }
    }

    /// Cuts the file into splits of at most `split_size_in_bytes`, never inside a line.
    /// A line longer than the split size gets a split of its own.
    pub fn split(&self) -> Result<Vec<InputSplit>, anyhow::Error> {
        if !self.path.exists() {
            return Err(anyhow::anyhow!(
                "Input file doesn't exist: {}",
                self.path.display()
            ));
        }

        let in_file = File::open(&self.path).context("Failed to open input file")?;
        let mut reader = BufReader::new(in_file);

        let mut results = Vec::new();
        let mut split_start = 0u64;
        let mut split_len = 0u64;
        let mut line = Vec::new();
        loop {
            line.clear();
            let line_len = reader
                .read_until(b'\n', &mut line)
                .context("Failed to read input file")? as u64;
            if line_len == 0 {
                break;
            }
            if split_len > 0 && split_len + line_len > self.split_size_in_bytes {
                results.push(InputSplit::new(&self.path, split_start, split_len));
                split_start += split_len;
                split_len = 0;
            }
            split_len += line_len;
        }
        if split_len > 0 {
            results.push(InputSplit::new(&self.path, split_start, split_len));
        }
        Ok(results)
    }
}
