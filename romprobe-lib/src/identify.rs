//! Identification orchestrator.
//!
//! Classifies the input (file / ZIP archive / folder), enumerates
//! contained items, and assembles the result: format dispatch, hash
//! computation per the hash-mode policy, and game identification.

use std::fs::File;
use std::path::{Path, PathBuf};

use romprobe_chd::ChdHeader;
use romprobe_core::{compute_hashes, Format, HashKind, Hashes, IdentError, RandomAccess};

use crate::container::folder;
use crate::container::zip::ZipContainer;
use crate::registry::{self, ZIP_MAGIC};
use crate::types::{HashMode, Item, Options, RomResult, FAST_MODE_SMALL_FILE_THRESHOLD};

/// Identify a ROM file, ZIP archive, or folder.
///
/// The path is resolved to absolute. Directories walk their contained
/// files; ZIP archives (detected by magic, not extension) enumerate
/// their entries; anything else is identified as a single item.
pub fn identify(path: impl AsRef<Path>, options: &Options) -> Result<RomResult, IdentError> {
    let abs = std::path::absolute(path.as_ref())?;
    let metadata = std::fs::metadata(&abs)?;

    if metadata.is_dir() {
        return identify_folder(abs, options);
    }
    identify_file(abs, metadata.len(), options)
}

fn identify_file(path: PathBuf, size: u64, options: &Options) -> Result<RomResult, IdentError> {
    let mut file = File::open(&path)?;

    // ZIP detection is by magic, not extension.
    if is_zip(&mut file, size) {
        return identify_zip(path, options);
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let item = identify_reader(&mut file, size, &name, options)?;

    Ok(RomResult {
        path,
        items: vec![item],
        error: None,
    })
}

fn identify_folder(path: PathBuf, options: &Options) -> Result<RomResult, IdentError> {
    let entries = folder::walk(&path)?;
    if entries.is_empty() {
        return Err(IdentError::other("folder is empty"));
    }

    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        let mut file = File::open(&entry.path)?;
        let item = identify_reader(&mut file, entry.size, &entry.name, options)
            .map_err(|e| IdentError::other(format!("identify {}: {}", entry.name, e)))?;
        items.push(item);
    }

    Ok(RomResult {
        path,
        items,
        error: None,
    })
}

fn identify_zip(path: PathBuf, options: &Options) -> Result<RomResult, IdentError> {
    let mut container = ZipContainer::open(&path)?;
    let entries = container.entries().to_vec();
    if entries.is_empty() {
        return Err(IdentError::other("ZIP archive is empty"));
    }

    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        if options.hash_mode == HashMode::Slow {
            // Slow mode: decompress and run full identification.
            let mut reader = container.open_entry(&entry)?;
            let item = identify_reader(&mut reader, entry.size, &entry.name, options)
                .map_err(|e| IdentError::other(format!("identify {}: {}", entry.name, e)))?;
            items.push(item);
        } else {
            // Default/fast: central-directory metadata only. The format
            // comes from the extension when it is unambiguous.
            let candidates = registry::candidates_by_extension(&entry.name);
            let format = if candidates.len() == 1 {
                candidates[0]
            } else {
                Format::Unknown
            };

            let mut hashes = Hashes::new();
            if entry.crc32 != 0 {
                hashes.insert(HashKind::ZipCrc32, format!("{:08x}", entry.crc32));
            }

            items.push(Item {
                name: entry.name,
                size: entry.size,
                format,
                hashes,
                game: None,
            });
        }
    }

    Ok(RomResult {
        path,
        items,
        error: None,
    })
}

/// Identify a single item from a reader: dispatch the format, then
/// apply the hash-mode policy.
fn identify_reader(
    reader: &mut dyn RandomAccess,
    size: u64,
    name: &str,
    options: &Options,
) -> Result<Item, IdentError> {
    let (format, game) = registry::identify_game(reader, size, name);

    let mut item = Item {
        name: name.to_string(),
        size,
        format,
        hashes: Hashes::new(),
        game,
    };

    // CHD: the header already carries both SHA1s; report them verbatim
    // instead of hashing the compressed container bytes.
    if format == Format::Chd {
        let header = ChdHeader::parse(reader, size)?;
        item.hashes
            .insert(HashKind::ChdUncompressedSha1, header.raw_sha1);
        item.hashes.insert(HashKind::ChdCompressedSha1, header.sha1);
        return Ok(item);
    }

    // Fast mode skips hashing for large files.
    if options.hash_mode == HashMode::Fast && size >= FAST_MODE_SMALL_FILE_THRESHOLD {
        return Ok(item);
    }

    item.hashes = compute_hashes(reader, size)?;
    Ok(item)
}

fn is_zip(reader: &mut dyn RandomAccess, size: u64) -> bool {
    if size < ZIP_MAGIC.len() as u64 {
        return false;
    }
    let mut magic = [0u8; 4];
    reader.read_exact_at(&mut magic, 0).is_ok() && magic == ZIP_MAGIC
}
