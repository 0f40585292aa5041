//! Integration tests for the public `open` entry point across formats,
//! external/library strategies, and all four modes.
//!
//! Compressed fixtures are produced with the codec crates directly, so the
//! external-path tests exercise real tool output handling whenever the tool
//! is installed; when it is not, `open` transparently falls back to the
//! library codec and the assertions still hold.

use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zseq::{open, ExternalTools, OpenOptions, SeqFile, SequentialRead, ZseqError};

const LINE_1: &str = "\u{a1}!\n";
const LINE_2: &str = "line 2\n";

fn fixtures(dir: &TempDir) -> Vec<PathBuf> {
    let _ = env_logger::builder().is_test(true).try_init();
    let text = format!("{LINE_1}{LINE_2}");
    let data = text.as_bytes();

    let regular = dir.path().join("out");
    std::fs::write(&regular, data).unwrap();

    let gz = dir.path().join("out.gz");
    {
        let file = std::fs::File::create(&gz).unwrap();
        let mut enc = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap();
    }

    let bz2 = dir.path().join("out.bz2");
    {
        let file = std::fs::File::create(&bz2).unwrap();
        let mut enc = bzip2::write::BzEncoder::new(file, bzip2::Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap();
    }

    let xz = dir.path().join("out.xz");
    {
        let file = std::fs::File::create(&xz).unwrap();
        let mut enc = xz2::write::XzEncoder::new(file, 6);
        enc.write_all(data).unwrap();
        enc.finish().unwrap();
    }

    vec![regular, gz, bz2, xz]
}

fn read_text_lines(path: &Path, options: OpenOptions) -> Vec<String> {
    let mut reader = open(path, "rt", options).unwrap().into_text_reader();
    reader.lines().map(|l| l.unwrap()).collect()
}

#[test]
fn reading_all_formats_and_strategies() {
    let dir = TempDir::new().unwrap();
    let data_binary = format!("{LINE_1}{LINE_2}").into_bytes();

    for path in fixtures(&dir) {
        for external in [false, true] {
            for parallel in [false, true] {
                let options = OpenOptions::new().external(external).parallel(parallel);

                // Text mode
                let lines = read_text_lines(&path, options.clone());
                assert_eq!(
                    lines,
                    vec![LINE_1.to_string(), LINE_2.to_string()],
                    "text read of {} (external={external}, parallel={parallel})",
                    path.display()
                );

                // Binary mode
                let mut reader = open(&path, "rb", options).unwrap().into_binary_reader();
                assert_eq!(
                    reader.read(None).unwrap(),
                    data_binary,
                    "binary read of {} (external={external}, parallel={parallel})",
                    path.display()
                );
                reader.close();
            }
        }
    }
}

#[test]
fn invalid_mode_is_rejected_before_io() {
    let err = open("", "x", OpenOptions::new()).unwrap_err();
    assert!(matches!(err, ZseqError::InvalidArgument { .. }));

    // A mode that is valid in spirit but not in the supported set
    let err = open("", "r", OpenOptions::new()).unwrap_err();
    assert!(matches!(err, ZseqError::InvalidArgument { .. }));
}

#[test]
fn unrecognized_suffix_is_passed_through_uncompressed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plain.log");
    std::fs::write(&path, b"as-is bytes\n").unwrap();

    // external/parallel are ignored for plain files
    let options = OpenOptions::new().external(true).parallel(true);
    let mut reader = open(&path, "rb", options).unwrap().into_binary_reader();
    assert_eq!(reader.read(None).unwrap(), b"as-is bytes\n");
}

#[test]
fn external_with_no_tools_falls_back_to_library_codec() {
    let dir = TempDir::new().unwrap();
    let paths = fixtures(&dir);

    let options = OpenOptions::new()
        .external(true)
        .parallel(true)
        .tools(ExternalTools::none());
    for path in &paths[1..] {
        let lines = read_text_lines(path, options.clone());
        assert_eq!(lines, vec![LINE_1.to_string(), LINE_2.to_string()]);
    }
}

#[test]
fn write_then_read_roundtrip_per_format() {
    let dir = TempDir::new().unwrap();
    let text = format!("{LINE_1}{LINE_2}");

    for name in ["roundtrip.txt", "roundtrip.gz", "roundtrip.bz2", "roundtrip.xz"] {
        let path = dir.path().join(name);

        let mut writer = open(&path, "wt", OpenOptions::new())
            .unwrap()
            .into_text_writer();
        writer.write(&text).unwrap();
        writer.close();

        let mut reader = open(&path, "rt", OpenOptions::new())
            .unwrap()
            .into_text_reader();
        assert_eq!(reader.read(None).unwrap(), text, "roundtrip of {name}");
    }
}

#[test]
fn binary_write_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.gz");
    let payload: Vec<u8> = (0u8..=255).cycle().take(10_000).collect();

    let mut writer = open(&path, "wb", OpenOptions::new())
        .unwrap()
        .into_binary_writer();
    writer.write(&payload).unwrap();
    writer.close();
    writer.close();

    let mut reader = open(&path, "rb", OpenOptions::new())
        .unwrap()
        .into_binary_reader();
    assert_eq!(reader.read(None).unwrap(), payload);
}

#[test]
fn seqfile_close_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.gz");
    {
        let file = std::fs::File::create(&path).unwrap();
        let mut enc = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        enc.write_all(b"payload\n").unwrap();
        enc.finish().unwrap();
    }

    let mut file = open(&path, "rb", OpenOptions::new()).unwrap();
    file.close();
    file.close();

    match file {
        SeqFile::ReadBinary(ref mut reader) => {
            assert!(matches!(reader.read(None), Err(ZseqError::StreamClosed)));
        }
        _ => panic!("expected a binary reader"),
    }
}

#[test]
fn scenario_from_the_contract() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scenario.gz");
    {
        let file = std::fs::File::create(&path).unwrap();
        let mut enc = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        enc.write_all(b"line 1\nline 2\nline 3\xe2\x80\xa6\n").unwrap();
        enc.finish().unwrap();
    }

    let mut reader = open(&path, "rb", OpenOptions::new())
        .unwrap()
        .into_binary_reader();
    assert_eq!(reader.read(Some(3)).unwrap(), b"lin");
    assert_eq!(reader.read(Some(5)).unwrap(), b"e 1\nl");
    assert_eq!(reader.read(None).unwrap(), b"ine 2\nline 3\xe2\x80\xa6\n");

    let mut reader = open(&path, "rt", OpenOptions::new())
        .unwrap()
        .into_text_reader();
    assert_eq!(reader.read_line().unwrap(), "line 1\n");
    assert_eq!(reader.read(None).unwrap(), "line 2\nline 3\u{2026}\n");
}
