//! Blocking client
//!
//! Thin connect/request/response wrapper over the wire protocol, shared by
//! the CLI binary and the end-to-end tests.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use crate::error::Result;
use crate::protocol::{read_response, write_command, Command, Response};

/// A blocking connection to a cinevault server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Send one command and wait for its response
    ///
    /// Not valid for `Quit`, which produces no response; use [`Client::quit`].
    pub fn request(&mut self, command: &Command) -> Result<Response> {
        debug_assert!(!matches!(*command, Command::Quit));

        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }

    /// End the session, telling the server to close it
    pub fn quit(mut self) -> Result<()> {
        write_command(&mut self.writer, &Command::Quit)?;
        Ok(())
    }
}
