//! 链路层模块
//!
//! 连接状态机、发送节拍和事件通知。定时行为全部以基准节拍
//! （默认 20ms → 50Hz）为单位，见 [`controller::LinkConfig`]。

pub mod controller;
pub mod events;
pub mod state;

pub use controller::{LinkConfig, LinkController};
pub use events::LinkEvent;
pub use state::{LinkStatus, Phase};

/// 搜索相位的慢速发送间隔（基准节拍的倍数）
pub const SEARCH_INTERVAL_TICKS: u32 = 50;

/// 连接窗口时长（基准节拍的倍数）；窗口内无遥测即判连接尝试失败
pub const CONNECT_TIMEOUT_TICKS: u32 = 5;

/// 连续丢包阈值；Active 相位下丢包计数超过该值即判定断连
pub const MISSED_PACKET_THRESHOLD: u32 = 10;
