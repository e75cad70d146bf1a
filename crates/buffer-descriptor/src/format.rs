// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Scalar element encodings.

/// Enumerates the scalar encodings a strided buffer can hold.
///
/// Parsed from struct-module style format codes (`"B"`, `"<i"`, `"d"`...).
/// Anything that is not a single native scalar code maps to
/// [`BufferFormat::Other`]; the raw string is always kept next to it in the
/// descriptor so user-defined codes survive round trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BufferFormat {
    /// `b`: signed 8-bit integer.
    Int8,
    /// `B`: unsigned 8-bit integer.
    UInt8,
    /// `h`: signed 16-bit integer.
    Int16,
    /// `H`: unsigned 16-bit integer.
    UInt16,
    /// `i` / `l`: signed 32-bit integer.
    Int32,
    /// `I` / `L`: unsigned 32-bit integer.
    UInt32,
    /// `q`: signed 64-bit integer.
    Int64,
    /// `Q`: unsigned 64-bit integer.
    UInt64,
    /// `n`: signed pointer-sized integer.
    ISize,
    /// `N`: unsigned pointer-sized integer.
    USize,
    /// `f`: 32-bit IEEE 754 float.
    Float32,
    /// `d`: 64-bit IEEE 754 float.
    Float64,
    /// `?`: one-byte boolean.
    Bool,
    /// `c`: one-byte character.
    Char,
    /// `P`: native pointer.
    Pointer,
    /// Any other (user-defined or compound) format code.
    Other,
}

impl BufferFormat {
    /// Parses a format string.
    ///
    /// A single leading byte-order character (`@`, `=`, `<`, `>`, `!`) is
    /// accepted. An empty string means unsigned bytes, as in the buffer
    /// protocol.
    pub fn from_format_string(format: &str) -> Self {
        let code = match format.as_bytes() {
            [] => return BufferFormat::UInt8,
            [b'@' | b'=' | b'<' | b'>' | b'!', rest @ ..] => rest,
            all => all,
        };
        match code {
            [b'b'] => BufferFormat::Int8,
            [b'B'] => BufferFormat::UInt8,
            [b'h'] => BufferFormat::Int16,
            [b'H'] => BufferFormat::UInt16,
            [b'i'] | [b'l'] => BufferFormat::Int32,
            [b'I'] | [b'L'] => BufferFormat::UInt32,
            [b'q'] => BufferFormat::Int64,
            [b'Q'] => BufferFormat::UInt64,
            [b'n'] => BufferFormat::ISize,
            [b'N'] => BufferFormat::USize,
            [b'f'] => BufferFormat::Float32,
            [b'd'] => BufferFormat::Float64,
            [b'?'] => BufferFormat::Bool,
            [b'c'] => BufferFormat::Char,
            [b'P'] => BufferFormat::Pointer,
            _ => BufferFormat::Other,
        }
    }

    /// Returns the size of a single element in bytes, or `None` for
    /// [`BufferFormat::Other`], whose size is whatever the exporter declares.
    pub fn item_size(self) -> Option<usize> {
        let size = match self {
            BufferFormat::Int8 | BufferFormat::UInt8 => 1,
            BufferFormat::Bool | BufferFormat::Char => 1,
            BufferFormat::Int16 | BufferFormat::UInt16 => 2,
            BufferFormat::Int32 | BufferFormat::UInt32 | BufferFormat::Float32 => 4,
            BufferFormat::Int64 | BufferFormat::UInt64 | BufferFormat::Float64 => 8,
            BufferFormat::ISize | BufferFormat::USize | BufferFormat::Pointer => {
                std::mem::size_of::<usize>()
            }
            BufferFormat::Other => return None,
        };
        Some(size)
    }

    /// Returns the canonical single-character code.
    pub fn as_str(self) -> &'static str {
        match self {
            BufferFormat::Int8 => "b",
            BufferFormat::UInt8 => "B",
            BufferFormat::Int16 => "h",
            BufferFormat::UInt16 => "H",
            BufferFormat::Int32 => "i",
            BufferFormat::UInt32 => "I",
            BufferFormat::Int64 => "q",
            BufferFormat::UInt64 => "Q",
            BufferFormat::ISize => "n",
            BufferFormat::USize => "N",
            BufferFormat::Float32 => "f",
            BufferFormat::Float64 => "d",
            BufferFormat::Bool => "?",
            BufferFormat::Char => "c",
            BufferFormat::Pointer => "P",
            BufferFormat::Other => "",
        }
    }

    /// Byte-sized formats (`b`, `B`, `c`) are the ones whose views may be
    /// hashed as plain byte strings.
    pub fn is_byte_format(self) -> bool {
        matches!(
            self,
            BufferFormat::Int8 | BufferFormat::UInt8 | BufferFormat::Char
        )
    }
}
