//! Wire format of the HCI packets exchanged with the controller.

pub use self::command::*;
pub use self::event::*;
pub use self::opcode::*;
pub use self::packet::*;
pub use self::status::*;

pub mod adv;
mod command;
mod event;
mod opcode;
mod packet;
mod status;
