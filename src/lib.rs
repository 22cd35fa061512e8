//! Gym Label Relay
//!
//! 画像をビジョンサービスに中継し、返ってきたラベルをジム器具の語彙で
//! 絞り込んで返す。フィルタ本体は gym_label_common にある。

pub mod cli;
pub mod config;
pub mod detector;
pub mod error;
pub mod flavor;
pub mod scanner;
pub mod server;
pub mod storage;
pub mod vision;

pub use gym_label_common as common;
