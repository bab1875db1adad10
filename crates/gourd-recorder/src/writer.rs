//! Background writer thread: drains the record channel into the sink.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

use gourd_log::LineSink;

/// How long the writer sleeps on an empty channel before re-polling.
const IDLE_POLL: Duration = Duration::from_millis(2);

/// Spawn the single consumer loop for a recording session.
///
/// The loop exits when the channel disconnects: the producer drops
/// its sender on stop, and crossbeam reports disconnection only after
/// the buffer is empty, so everything enqueued before stop is flushed.
/// An I/O failure terminates the writer after closing the sink; it is
/// logged and never propagates to the producer.
pub(crate) fn spawn_writer(
    rx: Receiver<String>,
    mut sink: Box<dyn LineSink>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("gourd-record-writer".into())
        .spawn(move || {
            loop {
                match rx.recv_timeout(IDLE_POLL) {
                    Ok(line) => {
                        if let Err(e) = sink.append_line(&line) {
                            log::error!("recording writer terminating on I/O failure: {e}");
                            if let Err(close_err) = sink.close() {
                                log::warn!("sink close after failure also failed: {close_err}");
                            }
                            return;
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            if let Err(e) = sink.close() {
                log::warn!("sink close failed: {e}");
            }
        })
}
