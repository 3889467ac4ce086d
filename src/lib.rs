//! A Telegram form that collects a deceased person's health history, sends it
//! to a cause-of-death prediction service and shows what comes back.

pub mod config;
pub mod form;
