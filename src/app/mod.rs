//! Core application logic: state management, event handling, and action dispatch.

pub mod action;
pub mod event;
pub mod forms;
pub mod handler;
pub mod quiz;
pub mod state;
pub mod ticker;
