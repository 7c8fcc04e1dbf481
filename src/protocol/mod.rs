//! 协议层模块
//!
//! 负责将 UDP 数据报的原始字节解析为类型安全的 Rust 结构体，
//! 以及将控制状态编码为固定长度的控制帧。
//! 本层是纯函数：无 I/O、无可变共享状态。

pub mod constants;
pub mod control;
pub mod telemetry;

pub use constants::*;
pub use control::*;
pub use telemetry::*;

use thiserror::Error;

/// 协议解析错误类型
///
/// 单个数据报解码失败对链路是非致命的：链路层记录日志后丢弃该帧，
/// 不影响相位和丢包计数（见 `link::controller`）。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// 帧长不足固定头部的最小长度
    #[error("malformed frame: {len} bytes, need at least {min}")]
    MalformedFrame { len: usize, min: usize },

    /// 变长段的长度前缀把某个偏移推到了缓冲区之外
    #[error("truncated frame: field at {offset}..{end} exceeds {len} bytes")]
    TruncatedFrame {
        offset: usize,
        end: usize,
        len: usize,
    },

    /// 模式名不在固定的模式表里
    #[error("unknown mode: {name:?}")]
    UnknownMode { name: String },
}

/// 字节序转换工具函数
///
/// 协议全程使用大端字节序（网络字节序）。
pub fn bytes_to_u16_be(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

/// 大端字节序转 u32
pub fn bytes_to_u32_be(bytes: [u8; 4]) -> u32 {
    u32::from_be_bytes(bytes)
}

/// u16 转大端字节序
pub fn u16_to_bytes_be(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}

/// u32 转大端字节序
pub fn u32_to_bytes_be(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_u16_be() {
        assert_eq!(bytes_to_u16_be([0x12, 0x34]), 0x1234);
        assert_eq!(bytes_to_u16_be([0xFF, 0xFF]), 0xFFFF);
    }

    #[test]
    fn test_bytes_to_u32_be() {
        assert_eq!(bytes_to_u32_be([0x12, 0x34, 0x56, 0x78]), 0x12345678);
    }

    #[test]
    fn test_roundtrip_u16() {
        let original = 0xB00B;
        assert_eq!(bytes_to_u16_be(u16_to_bytes_be(original)), original);
    }

    #[test]
    fn test_roundtrip_u32() {
        let original = 0xDEADBEEF;
        assert_eq!(bytes_to_u32_be(u32_to_bytes_be(original)), original);
    }
}
