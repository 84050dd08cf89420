//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Two clocks per packet: the OpenVR/protocol timestamp carried in the OSC
//!   payload and the local wall clock captured at callback time (seconds, f64)
//! - Relative timestamps are computed against the first packet of the session

mod address;
mod blueprint;
mod clock;
mod error;
mod packet;
mod row;
mod sink;
mod source;

pub use address::DeviceAddress;
pub use blueprint::*;
pub use clock::LocalClock;
pub use error::*;
pub use packet::*;
pub use row::*;
pub use sink::*;
pub use source::{DropPolicy, PacketCallback, PacketSource};
