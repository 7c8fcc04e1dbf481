//! frcds-link - 传统 FRC 驾驶站控制链路 SDK
//!
//! 面向老式 FRC 机器人控制器的客户端控制链路实现：
//! 通过 UDP 以 50Hz 持续刷新控制帧，从遥测响应中检测连接丢失，
//! 并解码混合定长/变长字段的二进制遥测帧。
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **协议层** (`protocol`): 纯函数式的帧编码/解码，无 I/O、无共享状态
//! - **传输层** (`transport`): UDP 数据报抽象（可替换为测试用 mock）
//! - **链路层** (`link`): 连接状态机、发送节拍、超时检测、事件通知
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use frcds_link::{LinkConfig, LinkController, Mode};
//!
//! let link = LinkController::start(LinkConfig::new(178))?;
//! let _events = link.subscribe();
//! link.set_mode(Mode::Teleoperated)?;
//! # Ok::<(), frcds_link::LinkError>(())
//! ```
//!
//! # 并发模型
//!
//! 所有可变状态（`ControlState`、连接相位）只由一个链路循环线程持有；
//! 接收线程和 API 调用方都通过同一条通道向该线程投递消息，
//! 因此入站帧处理和定时发送天然互斥（详见 [`link::controller`]）。

pub mod addressing;
pub mod error;
pub mod link;
pub mod protocol;
pub mod transport;

// 常用类型的 Facade 导出
pub use error::LinkError;
pub use link::{LinkConfig, LinkController, LinkEvent, LinkStatus, Phase};
pub use protocol::{
    ControlState, JoystickState, Mode, ProtocolError, TelemetryRecord, decode_telemetry_frame,
    encode_control_frame,
};
pub use transport::{FrameSink, FrameSource, UdpLink};
