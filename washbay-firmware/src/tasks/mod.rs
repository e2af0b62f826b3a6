//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod command_rx;
pub mod controller;
pub mod status_tx;
pub mod tick;

pub use command_rx::command_rx_task;
pub use controller::controller_task;
pub use status_tx::status_tx_task;
pub use tick::tick_task;
