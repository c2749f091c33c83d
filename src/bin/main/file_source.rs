use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use log::{debug, warn};
use pacer_core::{
    catalog::SourceId,
    error::LoadError,
    player::{SourceLoader, SourceText},
    structure::FormatTag,
};
use walkdir::WalkDir;

pub(super) const BYTES_PER_MB: u64 = 1024 * 1024;

const SCANNED_EXTENSIONS: [&str; 5] = ["md", "markdown", "txt", "pdf", "epub"];

/// Format from the file extension. Unknown extensions are read as plain text.
pub(super) fn detect_format(path: &Path) -> FormatTag {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("md" | "markdown") => FormatTag::Markdown,
        Some("pdf" | "epub") => FormatTag::Opaque,
        _ => FormatTag::PlainText,
    }
}

fn is_scanned(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SCANNED_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Expands folders into their readable files, sorted by path. Files named
/// directly are kept whatever their extension.
pub(super) fn collect_sources(paths: &[PathBuf]) -> anyhow::Result<Vec<SourceId>> {
    let mut sources = Vec::new();

    for path in paths {
        let metadata =
            fs::metadata(path).with_context(|| format!("cannot access {}", path.display()))?;

        if !metadata.is_dir() {
            sources.push(source_id(path));
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(path).follow_links(false) {
            let entry = entry.context("Failed to read directory entry")?;
            if entry.file_type().is_file() && is_scanned(entry.path()) {
                found.push(entry.into_path());
            }
        }
        found.sort();
        debug!("scan: dir={} files={}", path.display(), found.len());
        sources.extend(found.iter().map(|path| source_id(path)));
    }

    Ok(sources)
}

fn source_id(path: &Path) -> SourceId {
    SourceId::new(path.to_string_lossy())
}

/// Reads sources from the local filesystem.
pub(super) struct FileSourceLoader {
    max_bytes: u64,
}

impl FileSourceLoader {
    pub(super) const fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

impl SourceLoader for FileSourceLoader {
    fn load(&mut self, id: &SourceId) -> Result<SourceText, LoadError> {
        let path = Path::new(id.as_str());
        let format = detect_format(path);
        if format == FormatTag::Opaque {
            // No extractor on this host; the structurer rejects the tag.
            return Ok(SourceText::new(String::new(), format));
        }

        let metadata = fs::metadata(path).map_err(|err| read_error(path, &err))?;
        if metadata.len() > self.max_bytes {
            return Err(LoadError::Source(format!(
                "file is too large ({:.1}MB), maximum size is {}MB",
                metadata.len() as f64 / BYTES_PER_MB as f64,
                self.max_bytes / BYTES_PER_MB
            )));
        }

        let bytes = fs::read(path).map_err(|err| read_error(path, &err))?;
        let text = decode_text(&bytes).ok_or_else(|| {
            LoadError::Source(format!("{} is not a text file", path.display()))
        })?;

        debug!(
            "load: path={} format={} bytes={}",
            path.display(),
            format,
            bytes.len()
        );
        Ok(SourceText::new(text, format))
    }
}

fn read_error(path: &Path, err: &std::io::Error) -> LoadError {
    LoadError::Source(format!("{}: {err}", path.display()))
}

/// BOM first, then strict UTF-8, then Windows-1252 for legacy files. Data
/// with NUL bytes is treated as binary.
fn decode_text(bytes: &[u8]) -> Option<String> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        if had_errors {
            warn!("load: replaced malformed {} sequences", encoding.name());
        }
        return Some(text.into_owned());
    }

    if let Some(text) = UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
        return Some(text.into_owned());
    }

    if bytes.contains(&0) {
        return None;
    }

    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    Some(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_follow_extensions() {
        assert_eq!(detect_format(Path::new("a/notes.MD")), FormatTag::Markdown);
        assert_eq!(detect_format(Path::new("x.markdown")), FormatTag::Markdown);
        assert_eq!(detect_format(Path::new("x.txt")), FormatTag::PlainText);
        assert_eq!(detect_format(Path::new("x.epub")), FormatTag::Opaque);
        assert_eq!(detect_format(Path::new("x.pdf")), FormatTag::Opaque);
        assert_eq!(detect_format(Path::new("LICENSE")), FormatTag::PlainText);
        assert_eq!(detect_format(Path::new("main.rs")), FormatTag::PlainText);
    }

    #[test]
    fn folders_are_scanned_recursively_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.md"), "# B").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("nested").join("c.epub"), "").unwrap();
        fs::write(dir.path().join("skip.rs"), "fn main() {}").unwrap();

        let sources = collect_sources(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<String> = sources
            .iter()
            .map(|id| {
                Path::new(id.as_str())
                    .strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(names, vec!["a.txt", "b.md", "nested/c.epub"]);
    }

    #[test]
    fn named_files_keep_any_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.rs");
        fs::write(&path, "text").unwrap();

        let sources = collect_sources(&[path.clone()]).unwrap();
        assert_eq!(sources, vec![source_id(&path)]);
        assert!(collect_sources(&[dir.path().join("missing.md")]).is_err());
    }

    #[test]
    fn oversized_files_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.txt");
        fs::write(&path, "word ".repeat(100)).unwrap();

        let mut loader = FileSourceLoader::new(64);
        let err = loader.load(&source_id(&path)).unwrap_err();
        assert!(matches!(err, LoadError::Source(message) if message.contains("too large")));

        let mut loader = FileSourceLoader::new(BYTES_PER_MB);
        let text = loader.load(&source_id(&path)).unwrap();
        assert_eq!(text.format, FormatTag::PlainText);
    }

    #[test]
    fn opaque_files_are_not_read() {
        let mut loader = FileSourceLoader::new(BYTES_PER_MB);
        let text = loader.load(&SourceId::from("/nowhere/book.epub")).unwrap();
        assert_eq!(text, SourceText::new("", FormatTag::Opaque));
    }

    #[test]
    fn text_decoding_handles_boms_and_legacy_bytes() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFhola").as_deref(), Some("hola"));
        assert_eq!(decode_text(b"\xFF\xFEh\x00i\x00").as_deref(), Some("hi"));
        assert_eq!(decode_text("señor".as_bytes()).as_deref(), Some("señor"));
        assert_eq!(decode_text(b"caf\xE9").as_deref(), Some("café"));
        assert_eq!(decode_text(b"\x89PNG\x00\x00"), None);
    }
}
