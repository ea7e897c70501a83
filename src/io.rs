//! Loading edge lists and saving walks.  Paths ending in `.gz` are transparently
//! (de)compressed.
use std::fs::File;
use std::io::{BufRead,BufReader,BufWriter,Result as IOResult,Write};

use fast_float::parse;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use itertools::Itertools;
use rayon::prelude::*;
use tracing::info;

use crate::error::{Result,WalkError};
use crate::graph::{EdgeType,GraphBuilder,WalkGraph};

pub fn open_file_for_reading(path: &str) -> IOResult<Box<dyn BufRead>> {
    let f = File::open(path)?;

    let f = BufReader::new(f);
    let result: Box<dyn BufRead> = if path.ends_with(".gz") {
        let decoder = BufReader::new(GzDecoder::new(f));
        Box::new(decoder)
    } else {
        Box::new(f)
    };
    Ok(result)
}

/// A plain or gzip compressed output file.  Use [`OutputFile::finish`] rather than dropping it,
/// so errors writing the gzip trailer are reported.
pub enum OutputFile {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>)
}

impl OutputFile {
    pub fn finish(self) -> IOResult<()> {
        let mut bw = match self {
            OutputFile::Plain(bw) => bw,
            OutputFile::Gzip(e) => e.finish()?
        };
        bw.flush()
    }
}

impl Write for OutputFile {
    fn write(&mut self, buf: &[u8]) -> IOResult<usize> {
        match self {
            OutputFile::Plain(bw) => bw.write(buf),
            OutputFile::Gzip(e) => e.write(buf)
        }
    }

    fn flush(&mut self) -> IOResult<()> {
        match self {
            OutputFile::Plain(bw) => bw.flush(),
            OutputFile::Gzip(e) => e.flush()
        }
    }
}

pub fn open_file_for_writing(path: &str, compression: Option<u32>) -> IOResult<OutputFile> {
    let comp_level = compression.map(Compression::new);
    let f = File::create(path)?;
    let bw = BufWriter::new(f);
    let encoder = if path.ends_with(".gz") {
        OutputFile::Gzip(GzEncoder::new(bw, comp_level.unwrap_or(Compression::fast())))
    } else {
        OutputFile::Plain(bw)
    };
    Ok(encoder)
}

/// Reads whitespace separated `from to [weight]` edge lists.  Blank lines and lines starting
/// with `#` are skipped; extra columns are ignored.
#[derive(Clone,Copy,Debug)]
pub struct EdgeListReader {
    pub edge_type: EdgeType,

    /// Read the weight from the third column, otherwise every edge weighs 1
    pub weighted: bool,

    /// Lines parsed in parallel at a time
    pub chunk_size: usize
}

impl Default for EdgeListReader {
    fn default() -> Self {
        EdgeListReader {
            edge_type: EdgeType::Undirected,
            weighted: false,
            chunk_size: 10_000
        }
    }
}

impl EdgeListReader {

    pub fn load(&self, path: &str) -> Result<WalkGraph> {
        info!("Loading edges from {}", path);
        self.read(open_file_for_reading(path)?)
    }

    pub fn read(&self, reader: impl BufRead) -> Result<WalkGraph> {
        let mut builder = GraphBuilder::new();
        let mut offset = 0;
        let mut buffer: Vec<String> = Vec::with_capacity(self.chunk_size);
        let chunks = reader.lines().chunks(self.chunk_size.max(1));
        for chunk in &chunks {
            buffer.clear();
            for line in chunk {
                buffer.push(line?);
            }

            // Parse in parallel, but add edges in file order so NodeIDs are stable
            let records: Vec<_> = buffer.par_iter().enumerate()
                .map(|(i, line)| parse_line(offset + i + 1, line, self.weighted))
                .collect();

            for record in records {
                if let Some((from_node, to_node, weight)) = record? {
                    builder.add_edge(from_node, to_node, weight, self.edge_type);
                }
            }
            offset += buffer.len();
        }

        builder.build()
    }
}

fn parse_line(line_no: usize, line: &str, weighted: bool) -> Result<Option<(&str, &str, f32)>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None)
    }

    let pieces: Vec<_> = line.split_whitespace().collect();
    if pieces.len() < 2 {
        return Err(WalkError::Parse {
            line: line_no,
            message: format!("expected at least 2 fields, found {}", pieces.len())
        })
    }

    let weight = if weighted {
        let raw = pieces.get(2).ok_or_else(|| WalkError::Parse {
            line: line_no,
            message: "missing edge weight".into()
        })?;
        parse::<f32, _>(raw).map_err(|_| WalkError::Parse {
            line: line_no,
            message: format!("malformed edge weight {:?}", raw)
        })?
    } else {
        1f32
    };

    Ok(Some((pieces[0], pieces[1], weight)))
}

/// Writes walks one per line, node names separated by a single space.
pub struct WalkWriter {
    output: OutputFile
}

impl WalkWriter {
    pub fn new(path: &str, comp_level: Option<u32>) -> Result<Self> {
        Ok(WalkWriter { output: open_file_for_writing(path, comp_level)? })
    }

    pub fn stream<W, S>(&mut self, walks: impl Iterator<Item=W>) -> Result<()>
    where
        W: AsRef<[S]>,
        S: AsRef<str>
    {
        for walk in walks {
            let line = walk.as_ref().iter().map(|n| n.as_ref()).join(" ");
            writeln!(&mut self.output, "{}", line)?;
        }
        Ok(())
    }

    /// Flushes and closes the file, writing the gzip trailer if needed.
    pub fn finish(self) -> Result<()> {
        self.output.finish()?;
        Ok(())
    }
}
