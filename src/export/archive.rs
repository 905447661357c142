// Copyright (C) 2026 the samplepack authors
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! In-memory zip packing for finished packages.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::error::ExportError;

/// Collects named byte blobs into one deflate-compressed zip container.
/// Entries keep their insertion order and carry no timestamps beyond the
/// format's fixed epoch, so identical input produces identical bytes.
pub struct Archive {
    writer: ZipWriter<Cursor<Vec<u8>>>,
}

impl Archive {
    pub fn new() -> Archive {
        Archive {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Adds one file entry.
    pub fn add(&mut self, path: &str, bytes: &[u8]) -> Result<(), ExportError> {
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer.start_file(path, options)?;
        self.writer.write_all(bytes)?;
        Ok(())
    }

    /// Writes the central directory and returns the container bytes.
    pub fn finish(self) -> Result<Vec<u8>, ExportError> {
        Ok(self.writer.finish()?.into_inner())
    }
}

impl Default for Archive {
    fn default() -> Archive {
        Archive::new()
    }
}
