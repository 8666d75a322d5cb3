//! Browser-style SIP phone driving the Janus gateway's SIP plugin.
//!
//! [`call_controller::CallController`] holds the calling state machine and
//! talks to Janus through the [`gateway`] traits; the Dioxus [`components`]
//! only render its [`state::PhoneView`] and send it [`commands::PhoneCommand`]s.

pub mod call_controller;
pub mod commands;
pub mod components;
pub mod config;
pub mod error;
pub mod event_channel;
pub mod event_handler;
pub mod gateway;
pub mod media;
pub mod registration;
pub mod sip_messages;
pub mod state;
pub mod validation;

pub use call_controller::CallController;
pub use commands::PhoneCommand;
pub use config::PhoneConfig;
pub use error::PhoneError;
