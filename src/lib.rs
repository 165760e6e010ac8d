//! Host-side driver for the Aim-TTi (Thurlby Thandar) CPX400DP dual-channel bench power supply.
//!
//! The supply enumerates as a USB virtual COM port and speaks a newline terminated ASCII
//! protocol. [client::InstrumentClient] wraps that protocol; it can open a named port or find
//! the instrument on its own:
//!
//! ```no_run
//! use cpx400dp::client::InstrumentClient;
//!
//! let mut psu = InstrumentClient::new();
//! psu.discover_and_connect()?;
//! psu.set_voltage(12.0, 1)?;
//! psu.set_current(0.5, 1)?;
//! psu.enable_output(1)?;
//! println!("{} V", psu.get_output_voltage(1)?);
//! psu.disconnect()?;
//! # Ok::<(), cpx400dp::error::Error>(())
//! ```

pub mod client;
pub mod data;
pub mod error;
pub mod model;
pub mod protocol;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
