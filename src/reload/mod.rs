//! Applying generated configuration to a running BIRD daemon
//!
//! One exchange per run: read the greeting, send a single command, read the
//! reply. The socket is closed when the [`ControlSocket::apply`] future
//! completes, whatever the outcome.

mod codec;

pub use codec::{ControlProtocol, Line, LineCodec};

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use itertools::Itertools;
use log::{debug, info, trace};
use thiserror::Error;
use tokio::net::UnixStream;
use tokio_util::codec::Framed;

pub const DEFAULT_SOCKET: &str = "/run/bird/bird.ctl";
pub const DEFAULT_COMMAND: &str = "configure";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// BIRD reply codes from 8000 up are runtime and parse errors
const ERROR_CODES: u16 = 8000;

/// A complete daemon reply: every line up to and including the final one
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reply {
    pub code: Option<u16>,
    pub lines: Vec<String>,
}

impl Reply {
    pub fn is_error(&self) -> bool {
        matches!(self.code, Some(code) if code >= ERROR_CODES)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(code) = self.code {
            write!(f, "[{:04}] ", code)?;
        }
        write!(f, "{}", self.lines.iter().join(" / "))
    }
}

#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("connecting to control socket {}: {source}", path.display())]
    Connect { path: PathBuf, source: io::Error },
    #[error("control socket: {0}")]
    Io(#[from] io::Error),
    #[error("no reply from daemon within {0:?}")]
    Timeout(Duration),
    #[error("control socket closed before a complete reply")]
    Closed,
    #[error("daemon rejected command: {0}")]
    Rejected(Reply),
}

/// Client for a BIRD control socket
#[derive(Clone, Debug)]
pub struct ControlSocket {
    path: PathBuf,
    timeout: Duration,
}

impl ControlSocket {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bound on connecting and on each reply read
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Send `command` and wait for the daemon's reply
    ///
    /// Trailing newlines on `command` are replaced by exactly one.
    pub async fn apply(&self, command: &str) -> Result<Reply, ReloadError> {
        let stream = tokio::time::timeout(self.timeout, UnixStream::connect(&self.path))
            .await
            .map_err(|_| ReloadError::Timeout(self.timeout))?
            .map_err(|source| ReloadError::Connect {
                path: self.path.clone(),
                source,
            })?;
        let mut protocol: ControlProtocol = Framed::new(stream, LineCodec::new());

        let greeting = self.read_reply(&mut protocol).await?;
        info!("Connected to {}: {}", self.path.display(), greeting);

        debug!("Sending '{}'", command.trim_end());
        protocol.send(command).await?;

        let reply = self.read_reply(&mut protocol).await?;
        if reply.is_error() {
            return Err(ReloadError::Rejected(reply));
        }
        info!("Daemon replied: {}", reply);
        Ok(reply)
    }

    /// One full reply, all of its lines bounded by a single timeout
    async fn read_reply(&self, protocol: &mut ControlProtocol) -> Result<Reply, ReloadError> {
        tokio::time::timeout(self.timeout, read_lines(protocol))
            .await
            .map_err(|_| ReloadError::Timeout(self.timeout))?
    }
}

async fn read_lines(protocol: &mut ControlProtocol) -> Result<Reply, ReloadError> {
    let mut reply = Reply::default();
    loop {
        let line = match protocol.next().await {
            // Framed stream is exhausted, daemon closed the connection
            None => return Err(ReloadError::Closed),
            Some(line) => line?,
        };
        trace!("< {}", line);
        if line.code.is_some() {
            reply.code = line.code;
        }
        reply.lines.push(line.text);
        if line.last {
            return Ok(reply);
        }
    }
}

/// Connect to the socket at `path` and run one command with the default timeout
pub async fn apply<P: AsRef<Path>>(path: P, command: &str) -> Result<Reply, ReloadError> {
    ControlSocket::new(path.as_ref()).apply(command).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::UnixListener;
    use tokio::task::JoinHandle;

    /// Accepts one connection, answers with `greeting` then `reply` and
    /// returns the command line it received
    fn fake_daemon(listener: UnixListener, greeting: &'static str, reply: &'static str) -> JoinHandle<String> {
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read, mut write) = stream.into_split();
            write.write_all(greeting.as_bytes()).await.unwrap();
            let mut command = String::new();
            BufReader::new(read).read_line(&mut command).await.unwrap();
            write.write_all(reply.as_bytes()).await.unwrap();
            command
        })
    }

    #[tokio::test]
    async fn test_apply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bird.ctl");
        let daemon = fake_daemon(
            UnixListener::bind(&path).unwrap(),
            "0001 BIRD 2.0.8 ready.\n",
            "0002-Reading configuration from /etc/bird/bird.conf\n0003 Reconfigured\n",
        );

        let reply = apply(&path, "configure\n\n").await.unwrap();
        assert_eq!(reply.code, Some(3));
        assert_eq!(
            reply.lines,
            vec!["Reading configuration from /etc/bird/bird.conf", "Reconfigured"]
        );
        assert!(!reply.is_error());
        assert_eq!(daemon.await.unwrap(), "configure\n");
    }

    #[tokio::test]
    async fn test_apply_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bird.ctl");
        let daemon = fake_daemon(
            UnixListener::bind(&path).unwrap(),
            "0001 BIRD 2.0.8 ready.\n",
            "0002-Reading configuration from /etc/bird/bird.conf\n8002 /etc/bird/bird.conf:12:3 syntax error\n",
        );

        match ControlSocket::new(&path).apply("configure").await {
            Err(ReloadError::Rejected(reply)) => {
                assert_eq!(reply.code, Some(8002));
                assert_eq!(
                    reply.to_string(),
                    "[8002] Reading configuration from /etc/bird/bird.conf / /etc/bird/bird.conf:12:3 syntax error"
                );
            }
            other => panic!("unexpected result {:?}", other),
        }
        daemon.await.unwrap();
    }

    #[tokio::test]
    async fn test_apply_closed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bird.ctl");
        let daemon = fake_daemon(UnixListener::bind(&path).unwrap(), "0001 BIRD 2.0.8 ready.\n", "");

        let err = apply(&path, "configure").await.unwrap_err();
        assert!(matches!(err, ReloadError::Closed));
        daemon.await.unwrap();
    }

    #[tokio::test]
    async fn test_apply_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bird.ctl");
        let listener = UnixListener::bind(&path).unwrap();
        // Accepts but never greets
        let daemon = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(1)).await;
            drop(stream);
        });

        let err = ControlSocket::new(&path)
            .timeout(Duration::from_millis(50))
            .apply("configure")
            .await
            .unwrap_err();
        assert!(matches!(err, ReloadError::Timeout(_)));
        daemon.await.unwrap();
    }

    #[tokio::test]
    async fn test_apply_endless_reply_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bird.ctl");
        let listener = UnixListener::bind(&path).unwrap();
        // Keeps a reply open with continuation lines until the client hangs up
        let daemon = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (_read, mut write) = stream.into_split();
            write.write_all(b"0001 BIRD 2.0.8 ready.\n").await.unwrap();
            let mut sent = 0usize;
            while write.write_all(b"0002-still reading\n").await.is_ok() {
                sent += 1;
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            sent
        });

        let err = ControlSocket::new(&path)
            .timeout(Duration::from_millis(200))
            .apply("configure")
            .await
            .unwrap_err();
        assert!(matches!(err, ReloadError::Timeout(_)));
        assert!(daemon.await.unwrap() > 1);
    }

    #[tokio::test]
    async fn test_apply_missing_socket() {
        let dir = tempfile::tempdir().unwrap();
        let err = apply(dir.path().join("missing.ctl"), "configure")
            .await
            .unwrap_err();
        assert!(matches!(err, ReloadError::Connect { .. }));
        assert!(err.to_string().contains("missing.ctl"));
    }
}
