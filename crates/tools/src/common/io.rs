//! 入出力ユーティリティ（gzip 対応）
//!
//! 入力は拡張子 `.gz` または gzip のマジックバイトで圧縮を判定する。
//! パス `-` は標準入出力を表す。

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::bufread::MultiGzDecoder;
use flate2::write::GzEncoder;

const READER_BUF_CAP: usize = 128 * 1024; // 128 KiB

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn has_gz_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}

/// 行単位で読むためのリーダーを開く
pub fn open_reader<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead>> {
    let p = path.as_ref();
    if is_stdio(p) {
        return Ok(Box::new(BufReader::with_capacity(READER_BUF_CAP, io::stdin())));
    }

    let mut file = BufReader::with_capacity(READER_BUF_CAP, File::open(p)?);
    let compressed = has_gz_extension(p) || file.fill_buf()?.starts_with(&GZIP_MAGIC);
    if compressed {
        // 連結された gzip メンバーも続けて読む
        let dec = MultiGzDecoder::new(file);
        return Ok(Box::new(BufReader::with_capacity(READER_BUF_CAP, dec)));
    }
    Ok(Box::new(file))
}

/// 出力先（圧縮時は `close` で gzip フッタまで書き切る）
#[must_use = "call .close() to propagate compression/IO errors"]
pub enum Writer {
    Stdout(io::Stdout),
    Plain(BufWriter<File>),
    Gz(GzEncoder<BufWriter<File>>),
}

impl Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Writer::Stdout(s) => s.write(buf),
            Writer::Plain(f) => f.write(buf),
            Writer::Gz(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Writer::Stdout(s) => s.flush(),
            Writer::Plain(f) => f.flush(),
            Writer::Gz(e) => e.flush(),
        }
    }
}

impl Writer {
    /// ストリームを確定させる
    pub fn close(self) -> io::Result<()> {
        match self {
            Writer::Stdout(mut s) => s.flush(),
            Writer::Plain(mut f) => f.flush(),
            Writer::Gz(e) => e.finish()?.flush(),
        }
    }
}

/// 出力先を開く（`None` または `-` は標準出力）
pub fn open_writer(path: Option<&Path>) -> io::Result<Writer> {
    let Some(p) = path.filter(|p| !is_stdio(p)) else {
        return Ok(Writer::Stdout(io::stdout()));
    };
    let file = BufWriter::new(File::create(p)?);
    if has_gz_extension(p) {
        return Ok(Writer::Gz(GzEncoder::new(file, Compression::default())));
    }
    Ok(Writer::Plain(file))
}
