// Push Module - Inbound push payload handling
//
// This module receives untrusted push payloads over a named pipe and
// models their resolution into display parameters

pub mod payload;
pub mod receiver;

pub use receiver::start_push_receiver;
// pub use receiver::{start_push_receiver_with_config, ReceiverConfig}; // Unused
