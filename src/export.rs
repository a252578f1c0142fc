use crate::model::ClassPeriod;
use anyhow::{anyhow, Context};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const LAYOUT_ENTRY: &str = "layout.json";
pub const LAYOUT_FORMAT_V1: &str = "seating-layout-v1";
pub const PLAIN_JSON_FORMAT: &str = "plain-json";

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub bundle_format: String,
    pub sha256: String,
    pub desk_count: usize,
}

#[derive(Debug, Clone)]
pub struct ImportedLayout {
    pub format_detected: String,
    pub class_name: Option<String>,
    pub period: ClassPeriod,
}

/// `seating-<slug>.zip`, with the class name folded to `[a-z0-9-]`.
pub fn export_file_name(class_name: &str) -> String {
    let mut slug = String::with_capacity(class_name.len());
    for ch in class_name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "seating-layout.zip".to_string()
    } else {
        format!("seating-{slug}.zip")
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub fn export_layout_bundle(
    class_name: &str,
    period: &ClassPeriod,
    out_path: &Path,
) -> anyhow::Result<ExportSummary> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }

    let layout = serde_json::to_vec_pretty(period).context("failed to serialize layout")?;
    let checksum = sha256_hex(&layout);

    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let manifest = json!({
        "format": LAYOUT_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "className": class_name,
        "exportedAt": chrono::Utc::now().to_rfc3339(),
        "layoutSha256": checksum,
        "deskCount": period.students.len(),
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    zip.start_file(LAYOUT_ENTRY, opts)
        .context("failed to start layout entry")?;
    zip.write_all(&layout)
        .context("failed to write layout entry")?;

    zip.finish().context("failed to finalize zip bundle")?;

    tracing::info!(class = %class_name, path = %out_path.display(), "layout exported");
    Ok(ExportSummary {
        path: out_path.to_path_buf(),
        bundle_format: LAYOUT_FORMAT_V1.to_string(),
        sha256: checksum,
        desk_count: period.students.len(),
    })
}

/// Reads a layout bundle, or a bare JSON period file when the input is not a zip.
pub fn import_layout_bundle(in_path: &Path) -> anyhow::Result<ImportedLayout> {
    if !is_zip_file(in_path)? {
        let text = std::fs::read_to_string(in_path)
            .with_context(|| format!("failed to read {}", in_path.to_string_lossy()))?;
        let period = ClassPeriod::from_json(&text).context("layout file is invalid JSON")?;
        return Ok(ImportedLayout {
            format_detected: PLAIN_JSON_FORMAT.to_string(),
            class_name: None,
            period,
        });
    }

    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != LAYOUT_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", format));
    }

    let mut layout = Vec::new();
    archive
        .by_name(LAYOUT_ENTRY)
        .context("bundle missing layout.json")?
        .read_to_end(&mut layout)
        .context("failed to read layout.json")?;

    if let Some(expected) = manifest.get("layoutSha256").and_then(|v| v.as_str()) {
        let actual = sha256_hex(&layout);
        if actual != expected {
            return Err(anyhow!(
                "layout checksum mismatch: expected {}, got {}",
                expected,
                actual
            ));
        }
    }

    let text = String::from_utf8(layout).context("layout.json is not UTF-8")?;
    let period = ClassPeriod::from_json(&text).context("layout.json is invalid")?;
    let class_name = manifest
        .get("className")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    tracing::info!(path = %in_path.display(), "layout bundle read");
    Ok(ImportedLayout {
        format_detected: LAYOUT_FORMAT_V1.to_string(),
        class_name,
        period,
    })
}

fn is_zip_file(path: &Path) -> anyhow::Result<bool> {
    let mut f = File::open(path)
        .with_context(|| format!("failed to open input file {}", path.to_string_lossy()))?;
    let mut sig = [0u8; 4];
    let read = f.read(&mut sig).context("failed to read file signature")?;
    if read < 4 {
        return Ok(false);
    }
    Ok(sig == [0x50, 0x4B, 0x03, 0x04])
}
