//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Code (1) │ Len (4)  │      Payload (fields)       │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! Each payload field is `field_len (u32 BE) + UTF-8 bytes`; the field count
//! and order are fixed per command (see the module docs).
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │       UTF-8 text            │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use crate::catalog::GENRE_SEPARATOR;
use crate::error::{Result, VaultError};

use super::{Command, CommandCode, Response, Status};

/// Header size: 1 byte code/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (1 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: code (1) + payload_len (4) + length-prefixed fields
pub fn encode_command(command: &Command) -> Vec<u8> {
    let code = command.code() as u8;

    let mut payload = Vec::new();
    match command {
        Command::Quit | Command::ListIds | Command::ListAll => {}
        Command::Register {
            title,
            director,
            year,
            genres,
        } => {
            push_field(&mut payload, title);
            push_field(&mut payload, director);
            push_field(&mut payload, &year.to_string());
            push_field(&mut payload, &genres.join(&GENRE_SEPARATOR.to_string()));
        }
        Command::AddGenre { id, genre } => {
            push_field(&mut payload, &id.to_string());
            push_field(&mut payload, genre);
        }
        Command::Remove { id } | Command::ListById { id } => {
            push_field(&mut payload, &id.to_string());
        }
        Command::ListByGenre { genre } => {
            push_field(&mut payload, genre);
        }
    }

    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.push(code);
    message.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    message.extend_from_slice(&payload);

    message
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (type_byte, payload) = split_frame(bytes, "request")?;

    let code = CommandCode::from_u8(type_byte).ok_or(VaultError::InvalidCommand(type_byte))?;
    let fields = decode_fields(payload, code.field_count())?;

    match code {
        CommandCode::Quit => Ok(Command::Quit),
        CommandCode::ListIds => Ok(Command::ListIds),
        CommandCode::ListAll => Ok(Command::ListAll),
        CommandCode::Register => {
            let [title, director, year, genres] = into_array(fields);
            Ok(Command::Register {
                title,
                director,
                year: parse_number(&year, "year")?,
                genres: split_genres(&genres),
            })
        }
        CommandCode::AddGenre => {
            let [id, genre] = into_array(fields);
            Ok(Command::AddGenre {
                id: parse_number(&id, "id")?,
                genre,
            })
        }
        CommandCode::Remove => {
            let [id] = into_array(fields);
            Ok(Command::Remove {
                id: parse_number(&id, "id")?,
            })
        }
        CommandCode::ListById => {
            let [id] = into_array(fields);
            Ok(Command::ListById {
                id: parse_number(&id, "id")?,
            })
        }
        CommandCode::ListByGenre => {
            let [genre] = into_array(fields);
            Ok(Command::ListByGenre { genre })
        }
    }
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + text
pub fn encode_response(response: &Response) -> Vec<u8> {
    let payload = response.message.as_bytes();

    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.push(response.status as u8);
    message.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    message.extend_from_slice(payload);

    message
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes, "response")?;

    let status = match status_byte {
        0 => Status::Ok,
        1 => Status::NotFound,
        2 => Status::Error,
        _ => {
            return Err(VaultError::Protocol(format!(
                "unknown response status: 0x{:02x}",
                status_byte
            )))
        }
    };

    let message = std::str::from_utf8(payload)
        .map_err(|e| VaultError::Protocol(format!("response text is not UTF-8: {}", e)))?
        .to_string();

    Ok(Response { status, message })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete command frame from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let frame = read_frame(reader)?;
    decode_command(&frame)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    writer.write_all(&encode_command(command))?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response frame from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let frame = read_frame(reader)?;
    decode_response(&frame)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(&encode_response(response))?;
    writer.flush()?;
    Ok(())
}

/// Read header + payload into a single frame buffer
///
/// A header advertising a payload over [`MAX_PAYLOAD_SIZE`] fails with
/// [`VaultError::FrameTooLarge`] before any payload byte is read; the stream
/// is out of sync after that and the session must be closed.
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]) as usize;
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(VaultError::FrameTooLarge {
            len: payload_len,
            max: MAX_PAYLOAD_SIZE,
        });
    }

    let mut frame = vec![0u8; HEADER_SIZE + payload_len];
    frame[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut frame[HEADER_SIZE..])?;
    }

    Ok(frame)
}

// =============================================================================
// Private Helpers
// =============================================================================

/// Validate a frame header and return (type byte, payload slice)
fn split_frame<'a>(bytes: &'a [u8], kind: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(VaultError::Protocol(format!(
            "incomplete {} header: expected {} bytes, got {}",
            kind,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let payload_len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(VaultError::FrameTooLarge {
            len: payload_len,
            max: MAX_PAYLOAD_SIZE,
        });
    }

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(VaultError::Protocol(format!(
            "incomplete {} payload: expected {} bytes, got {}",
            kind,
            total_len,
            bytes.len()
        )));
    }

    Ok((bytes[0], &bytes[HEADER_SIZE..total_len]))
}

/// Append one length-prefixed field
fn push_field(payload: &mut Vec<u8>, field: &str) {
    payload.extend_from_slice(&(field.len() as u32).to_be_bytes());
    payload.extend_from_slice(field.as_bytes());
}

/// Decode exactly `expected` length-prefixed fields, rejecting trailing bytes
fn decode_fields(payload: &[u8], expected: usize) -> Result<Vec<String>> {
    let mut fields = Vec::with_capacity(expected);
    let mut offset = 0;

    for index in 0..expected {
        if payload.len() < offset + 4 {
            return Err(VaultError::Protocol(format!(
                "missing length prefix for field {} of {}",
                index + 1,
                expected
            )));
        }

        let len = u32::from_be_bytes([
            payload[offset],
            payload[offset + 1],
            payload[offset + 2],
            payload[offset + 3],
        ]) as usize;
        offset += 4;

        if payload.len() < offset + len {
            return Err(VaultError::Protocol(format!(
                "incomplete field {} of {}: expected {} bytes, got {}",
                index + 1,
                expected,
                len,
                payload.len() - offset
            )));
        }

        let field = std::str::from_utf8(&payload[offset..offset + len])
            .map_err(|e| VaultError::Protocol(format!("field is not UTF-8: {}", e)))?;
        fields.push(field.to_string());
        offset += len;
    }

    if offset != payload.len() {
        return Err(VaultError::Protocol(format!(
            "{} trailing bytes after {} fields",
            payload.len() - offset,
            expected
        )));
    }

    Ok(fields)
}

/// Parse a numeric field, surfacing bad input instead of coercing to zero
fn parse_number<T: std::str::FromStr>(value: &str, field: &'static str) -> Result<T> {
    value.trim().parse().map_err(|_| VaultError::MalformedInput {
        field,
        value: value.to_string(),
    })
}

/// Split a `;`-joined genre field; an empty field means no genres
fn split_genres(field: &str) -> Vec<String> {
    if field.is_empty() {
        Vec::new()
    } else {
        field.split(GENRE_SEPARATOR).map(str::to_string).collect()
    }
}

/// Convert a field vector of known length into an array
///
/// Only called after `decode_fields` returned exactly `N` fields.
fn into_array<const N: usize>(fields: Vec<String>) -> [String; N] {
    match fields.try_into() {
        Ok(array) => array,
        Err(_) => unreachable!("decode_fields returned the wrong field count"),
    }
}
