//! Plain and TLS socket handling.

use crate::error::{Error, Result};
use rustls::pki_types::ServerName;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};

/// A buffered SMTP socket, plain or TLS.
#[derive(Debug)]
pub enum SmtpStream {
    /// Plain TCP.
    Tcp(BufReader<TcpStream>),
    /// TLS over TCP.
    Tls(Box<BufReader<TlsStream<TcpStream>>>),
}

impl SmtpStream {
    /// Reads one line with the line terminator removed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error, or [`Error::Protocol`] if the server closed the
    /// connection.
    pub async fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = match self {
            Self::Tcp(reader) => reader.read_line(&mut line).await?,
            Self::Tls(reader) => reader.read_line(&mut line).await?,
        };
        if read == 0 {
            return Err(Error::Protocol("connection closed by server".into()));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Writes and flushes `data`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the write fails.
    pub async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        match self {
            Self::Tcp(reader) => {
                let socket = reader.get_mut();
                socket.write_all(data).await?;
                socket.flush().await?;
            }
            Self::Tls(reader) => {
                let socket = reader.get_mut();
                socket.write_all(data).await?;
                socket.flush().await?;
            }
        }
        Ok(())
    }

    /// Performs the TLS handshake on a plain connection (after STARTTLS).
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is already encrypted or the handshake
    /// fails.
    pub async fn upgrade(self, hostname: &str) -> Result<Self> {
        let Self::Tcp(reader) = self else {
            return Err(Error::Protocol("connection is already encrypted".into()));
        };
        let tls = handshake(hostname, reader.into_inner()).await?;
        Ok(Self::Tls(Box::new(BufReader::new(tls))))
    }
}

/// Opens a plain TCP connection.
///
/// # Errors
///
/// Returns an I/O error if the connection fails.
pub async fn connect(hostname: &str, port: u16) -> Result<SmtpStream> {
    let socket = TcpStream::connect((hostname, port)).await?;
    Ok(SmtpStream::Tcp(BufReader::new(socket)))
}

/// Opens an implicit-TLS connection (usually port 465).
///
/// # Errors
///
/// Returns an error if the connection or the handshake fails.
pub async fn connect_tls(hostname: &str, port: u16) -> Result<SmtpStream> {
    let socket = TcpStream::connect((hostname, port)).await?;
    let tls = handshake(hostname, socket).await?;
    Ok(SmtpStream::Tls(Box::new(BufReader::new(tls))))
}

async fn handshake(hostname: &str, socket: TcpStream) -> Result<TlsStream<TcpStream>> {
    let server_name = ServerName::try_from(hostname.to_string())
        .map_err(|_| Error::Protocol(format!("invalid TLS server name: {hostname}")))?;

    let roots = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };
    let config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();

    let stream = TlsConnector::from(Arc::new(config))
        .connect(server_name, socket)
        .await?;
    Ok(stream)
}
