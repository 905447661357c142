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

use crate::slicer::SliceError;

/// Error produced while packing an instrument package. Zone data is
/// validated long before export, so in practice these only surface
/// plumbing failures from the archive layer.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to slice the source recording: {0}")]
    Slice(#[from] SliceError),

    #[error("Failed to pack the archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Failed to write an archive entry: {0}")]
    Io(#[from] std::io::Error),
}
