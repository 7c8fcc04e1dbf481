//! 链路层错误类型定义

use crate::protocol::ProtocolError;
use thiserror::Error;

/// 链路层错误类型
///
/// 没有任何错误会终结进程；唯一的终态是显式调用 `stop()`。
#[derive(Error, Debug)]
pub enum LinkError {
    /// 设备编号不在地址解析方案接受的范围内
    ///
    /// 由 `start()` 同步返回，修正编号前不可重试。
    #[error("invalid unit id: {unit_id}")]
    Validation { unit_id: u16 },

    /// 协议错误（含模式名不在固定表内）
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 连接窗口内没有收到任何遥测帧
    ///
    /// 通过事件异步送达；链路自动回退到搜索相位并继续重试。
    #[error("no telemetry within the connect window")]
    ConnectTimeout,

    /// 传输层 I/O 错误（套接字创建/绑定失败等）
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 链路循环已退出（stop() 之后调用 setter）
    #[error("link loop closed")]
    ChannelClosed,

    /// 无效输入（槽位/通道序号越界等）
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
