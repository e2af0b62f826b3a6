//! Console UART receive task
//!
//! Turns received bytes into controller commands.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use crate::channels::COMMAND_CHANNEL;
use crate::console::{parse_byte, Input};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 32;

/// Command RX task - reads single-byte commands from the console
#[embassy_executor::task]
pub async fn command_rx_task(mut rx: BufferedUartRx) {
    info!("Command RX task started");

    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match parse_byte(byte) {
                        Input::Command(cmd) => {
                            debug!("Command: {:?}", cmd);
                            // Commands are never dropped: an emergency stop
                            // must get through even when the queue is busy
                            COMMAND_CHANNEL.send(cmd).await;
                        }
                        Input::Skip => {}
                        Input::Unknown(b) => {
                            warn!("Ignoring unknown command byte {=u8:#x}", b);
                        }
                    }
                }
            }
            Ok(_) => {
                // No bytes read, continue
            }
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}
