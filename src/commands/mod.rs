//! CLI command implementations
//!
//! Device-level commands (`info`, `status`, `set-delay`) work on a
//! [`DeviceSession`](i2cusb_core::DeviceSession); bus commands (`scan`,
//! `read`, `write`, `write-read`) work on an [`I2cBus`](i2cusb_core::I2cBus).

mod device;
mod list;
mod scan;
mod transfer;

pub use device::{run_info, run_set_delay, run_status};
pub use list::list_devices;
pub use scan::run_scan;
pub use transfer::{run_read, run_write, run_write_read};
