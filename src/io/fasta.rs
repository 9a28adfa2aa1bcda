use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::Path;

/// 写出 FASTA 时每行的序列宽度
pub const LINE_WIDTH: usize = 70;

#[derive(Debug, Clone)]
pub struct FastaRecord {
    /// 完整的标题行（去掉 '>' 和首尾空白）
    pub header: String,
    /// 标题行第一个空白之前的部分
    pub id: String,
    pub seq: Vec<u8>,
}

pub struct FastaReader<R: BufRead> {
    reader: R,
    buf: String,
    done: bool,
    peek_header: Option<String>,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            done: false,
            peek_header: None,
        }
    }

    pub fn next_record(&mut self) -> Result<Option<FastaRecord>> {
        if self.done {
            return Ok(None);
        }

        // Find header line
        let header = if let Some(h) = self.peek_header.take() {
            h
        } else {
            loop {
                self.buf.clear();
                let n = self.reader.read_line(&mut self.buf)?;
                if n == 0 {
                    self.done = true;
                    return Ok(None);
                }
                if let Some(rest) = self.buf.strip_prefix('>') {
                    break rest.trim().to_string();
                }
            }
        };

        let id = header.split(char::is_whitespace).next().unwrap_or("").to_string();

        // Read sequence lines
        let mut seq: Vec<u8> = Vec::new();
        loop {
            self.buf.clear();
            let n = self.reader.read_line(&mut self.buf)?;
            if n == 0 {
                self.done = true;
                break;
            }
            if let Some(rest) = self.buf.strip_prefix('>') {
                self.peek_header = Some(rest.trim().to_string());
                break;
            }
            for &b in self.buf.as_bytes() {
                match b {
                    b'\n' | b'\r' | b' ' | b'\t' => {}
                    _ => seq.push(b.to_ascii_uppercase()),
                }
            }
        }

        Ok(Some(FastaRecord { header, id, seq }))
    }
}

/// 读取整个 FASTA 文件
pub fn read_fasta_file(path: &Path) -> Result<Vec<FastaRecord>> {
    let fh = std::fs::File::open(path)
        .map_err(|e| anyhow::anyhow!("cannot open FASTA '{}': {}", path.display(), e))?;
    let mut reader = FastaReader::new(std::io::BufReader::new(fh));
    let mut records = Vec::new();
    while let Some(rec) = reader.next_record()? {
        records.push(rec);
    }
    Ok(records)
}

/// 写出一条 FASTA 记录，序列按 [`LINE_WIDTH`] 折行。
pub fn write_record<W: Write>(out: &mut W, header: &str, seq: &[u8]) -> std::io::Result<()> {
    writeln!(out, ">{}", header)?;
    for chunk in seq.chunks(LINE_WIDTH) {
        out.write_all(chunk)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}
