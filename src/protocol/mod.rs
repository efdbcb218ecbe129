//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! The legacy protocol relied on one `recv` per field with no framing, which
//! only works while every client write arrives as exactly one read. This
//! version keeps the command numbering but frames every request and response
//! explicitly, so argument boundaries survive coalesced or fragmented
//! transport writes.
//!
//! ## Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Code (1) │ Len (4)  │      Payload (fields)       │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//! Payload is a fixed, command-specific sequence of fields, each encoded as
//! `field_len (u32 BE) + UTF-8 bytes`. Numeric arguments travel as text and
//! are parsed during decode; a failed parse is a `MalformedInput` error, not
//! a silent zero.
//!
//! ### Command Codes
//! - 0: QUIT          - no fields, no response
//! - 1: REGISTER      - title, director, year, genres (`;`-joined)
//! - 2: ADD_GENRE     - id, genre
//! - 3: REMOVE        - id
//! - 4: LIST_IDS      - no fields
//! - 5: LIST_ALL      - no fields
//! - 6: LIST_BY_ID    - id
//! - 7: LIST_BY_GENRE - genre
//!
//! ## Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │       UTF-8 text            │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0: OK
//! - 1: NOT_FOUND
//! - 2: ERROR
//!
//! A request header advertising a payload over [`MAX_PAYLOAD_SIZE`] is
//! refused without reading the payload; since those bytes would otherwise be
//! misread as later frames, the server answers with an error and closes the
//! session.

mod codec;
mod command;
mod response;

pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
pub use command::{Command, CommandCode};
pub use response::{Response, Status};
