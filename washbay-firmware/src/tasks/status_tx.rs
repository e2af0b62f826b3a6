//! Console UART transmit task
//!
//! Writes one text line per status update.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use crate::channels::STATUS_CHANNEL;
use crate::console::format_line;

/// Status TX task - drains the status channel to the console
#[embassy_executor::task]
pub async fn status_tx_task(mut tx: BufferedUartTx) {
    info!("Status TX task started");

    loop {
        let status = STATUS_CHANNEL.receive().await;
        let line = format_line(&status);

        if let Err(e) = tx.write_all(line.as_bytes()).await {
            warn!("Failed to send status line: {:?}", e);
        } else {
            trace!("Status sent: {:?}", status);
        }
    }
}
