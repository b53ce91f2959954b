//! Length-prefixed JSON framing over a byte pipe.
//!
//! Each frame is a 4-byte little-endian length followed by that many bytes of
//! UTF-8 JSON. The renderer host speaks this framing on its stdin/stdout.


use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::error::{Error, Result};

/// Largest inbound frame the reader accepts. Renderer messages are small
/// status objects; a header above this is treated as a corrupt stream.
pub const MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

/// Bidirectional pipe transport before it is split into halves.
pub struct PipeTransport<W, R> {
	sender: PipeTransportSender<W>,
	receiver: PipeTransportReceiver<R>,
}

impl<W, R> PipeTransport<W, R>
where
	W: AsyncWrite + Unpin + Send,
	R: AsyncRead + Unpin + Send,
{
	/// Creates a transport writing to `writer` and reading from `reader`.
	///
	/// Decoded inbound frames are delivered on the returned receiver once
	/// [`run`](Self::run) (or the receiver half's `run`) is driven.
	pub fn new(writer: W, reader: R) -> (Self, mpsc::UnboundedReceiver<Value>) {
		let (message_tx, message_rx) = mpsc::unbounded_channel();
		let transport = Self {
			sender: PipeTransportSender { writer },
			receiver: PipeTransportReceiver { reader, message_tx },
		};
		(transport, message_rx)
	}

	/// Writes one framed message.
	pub async fn send(&mut self, message: Value) -> Result<()> {
		self.sender.send(message).await
	}

	/// Reads frames until the pipe closes.
	pub async fn run(&mut self) -> Result<()> {
		self.receiver.read_loop().await
	}

	/// Splits the transport into independently owned halves.
	pub fn into_parts(self) -> (PipeTransportSender<W>, PipeTransportReceiver<R>) {
		(self.sender, self.receiver)
	}
}

/// Write half of a [`PipeTransport`].
pub struct PipeTransportSender<W> {
	writer: W,
}

impl<W: AsyncWrite + Unpin + Send> PipeTransportSender<W> {
	/// Writes one framed message and flushes.
	pub async fn send(&mut self, message: Value) -> Result<()> {
		let body = serde_json::to_vec(&message)?;
		let length = u32::try_from(body.len())
			.map_err(|_| Error::Transport(format!("message of {} bytes exceeds frame limit", body.len())))?;

		self.writer.write_all(&length.to_le_bytes()).await?;
		self.writer.write_all(&body).await?;
		self.writer.flush().await?;
		Ok(())
	}
}

/// Read half of a [`PipeTransport`].
pub struct PipeTransportReceiver<R> {
	reader: R,
	message_tx: mpsc::UnboundedSender<Value>,
}

impl<R: AsyncRead + Unpin + Send> PipeTransportReceiver<R> {
	/// Reads frames until EOF, forwarding each decoded message.
	///
	/// A clean EOF on a frame boundary returns `Ok(())`. EOF inside a frame
	/// and a length header above [`MAX_FRAME_BYTES`] are transport errors.
	/// Frames that are not valid JSON are skipped.
	pub async fn run(mut self) -> Result<()> {
		self.read_loop().await
	}

	async fn read_loop(&mut self) -> Result<()> {
		loop {
			let mut len_buf = [0u8; 4];
			match self.reader.read_exact(&mut len_buf).await {
				Ok(_) => {}
				Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(()),
				Err(e) => return Err(e.into()),
			}

			let length = u32::from_le_bytes(len_buf) as usize;
			if length > MAX_FRAME_BYTES {
				return Err(Error::Transport(format!(
					"frame of {length} bytes exceeds the {MAX_FRAME_BYTES} byte limit"
				)));
			}
			let mut body = vec![0u8; length];
			self.reader
				.read_exact(&mut body)
				.await
				.map_err(|e| Error::Transport(format!("truncated frame ({length} bytes expected): {e}")))?;

			match serde_json::from_slice::<Value>(&body) {
				Ok(message) => {
					if self.message_tx.send(message).is_err() {
						tracing::debug!(target = "bioview.transport", "message receiver dropped; stopping reader");
						return Ok(());
					}
				}
				Err(e) => {
					tracing::warn!(target = "bioview.transport", error = %e, length, "skipping undecodable frame");
				}
			}
		}
	}
}
