// Command pattern for phone operations
// This module defines commands sent from the UI to the controller coroutine

pub mod phone_commands;

pub use phone_commands::PhoneCommand;
