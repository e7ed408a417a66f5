// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::{
    arch::{Word, IMAGE_PAYLOAD_OFFSET},
    memory::InstructionStore,
};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{}: no such file or directory", .0.display())]
    NotFound(PathBuf),
    #[error("{}: not a regular file", .0.display())]
    NotAFile(PathBuf),
    #[error("{}: unable to read file", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("program has {words} words but at most {capacity} fit")]
    ProgramTooLarge { words: usize, capacity: usize },
}

/// Decodes the instruction words of a program image. The header is skipped
/// and every following byte pair is one word, high byte first; a trailing
/// odd byte is ignored.
pub fn decode_image(bytes: &[u8]) -> Vec<Word> {
    bytes
        .get(IMAGE_PAYLOAD_OFFSET..)
        .unwrap_or_default()
        .chunks_exact(2)
        .map(|pair| Word::from_be_bytes([pair[0], pair[1]]))
        .collect()
}

/// Inverse of [`decode_image`], with a zeroed header.
pub fn encode_image(program: &[Word]) -> Vec<u8> {
    let mut bytes = vec![0; IMAGE_PAYLOAD_OFFSET];
    bytes.extend(program.iter().flat_map(|word| word.to_be_bytes()));
    bytes
}

/// Reads the instruction words of the program image at `path`.
pub fn read_image(path: impl AsRef<Path>) -> Result<Vec<Word>, LoadError> {
    let path = path.as_ref();
    let metadata = fs::metadata(path).map_err(|error| match error.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source: error,
        },
    })?;
    if !metadata.is_file() {
        return Err(LoadError::NotAFile(path.to_path_buf()));
    }

    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let program = decode_image(&bytes);
    log::info!(
        "loaded {} instruction words from {}",
        program.len(),
        path.display()
    );
    Ok(program)
}

/// Reads the program image at `path` into a sentinel-terminated
/// [`InstructionStore`].
pub fn load_image(
    path: impl AsRef<Path>,
) -> Result<InstructionStore, LoadError> {
    InstructionStore::load(&read_image(path)?)
}

#[cfg(test)]
mod tests {
    use crate::{
        arch::IMAGE_PAYLOAD_OFFSET,
        loader::{decode_image, encode_image},
    };

    #[test]
    fn skips_header_and_swaps_bytes() {
        let mut bytes = vec![0xaa; IMAGE_PAYLOAD_OFFSET];
        bytes.extend([0x12, 0x34, 0xec, 0x10]);
        assert_eq!(vec![0x1234, 0xec10], decode_image(&bytes));
    }

    #[test]
    fn ignores_trailing_byte() {
        let mut bytes = vec![0; IMAGE_PAYLOAD_OFFSET];
        bytes.extend([0x00, 0x05, 0x7f]);
        assert_eq!(vec![0x0005], decode_image(&bytes));
    }

    #[test]
    fn short_image_is_empty() {
        assert!(decode_image(&[]).is_empty());
        assert!(decode_image(&[1, 2, 3]).is_empty());
        assert!(decode_image(&[0; IMAGE_PAYLOAD_OFFSET]).is_empty());
    }

    #[test]
    fn encodes_with_zero_header() {
        let bytes = encode_image(&[0x0102, 0xfc10]);
        assert_eq!(IMAGE_PAYLOAD_OFFSET + 4, bytes.len());
        assert!(bytes[..IMAGE_PAYLOAD_OFFSET].iter().all(|&b| b == 0));
        assert_eq!(&[0x01, 0x02, 0xfc, 0x10], &bytes[IMAGE_PAYLOAD_OFFSET..]);
    }
}
