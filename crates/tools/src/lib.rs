//! パラメータ調整用のオフラインツール群

pub mod common;
pub mod phase_fit;
