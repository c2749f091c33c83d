//! Pacing core for rapid serial visual presentation.
//!
//! Raw text flows one way: [`structure`] classifies lines into titles and
//! body text, [`segment`] turns those units into display chunks, and
//! [`player`] presents the chunks on a timer driven through the injected
//! [`timer::TimerQueue`].

pub mod catalog;
pub mod config;
pub mod error;
pub mod orp;
pub mod player;
pub mod segment;
pub mod session;
pub mod state;
pub mod structure;
pub mod timer;
