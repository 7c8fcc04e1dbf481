//! 传输层抽象
//!
//! 链路控制器通过 [`FrameSink`] / [`FrameSource`] 两个 trait 收发数据报，
//! 对真实 UDP 套接字和测试用的 [`mock`] 传输一视同仁。
//! 发送是 fire-and-forget 的 UDP 语义：目的地不可达时帧被静默丢弃，
//! 发送错误只记录、不重试。

pub mod mock;

use crate::protocol::{CONTROL_PORT, TELEMETRY_PORT};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::Duration;

/// 出站数据报的发送端
pub trait FrameSink: Send + 'static {
    /// 发送一帧；错误由调用方记录，不会向上传播给 API 调用者
    fn send(&mut self, frame: &[u8]) -> io::Result<()>;
}

/// 入站数据报的接收端
pub trait FrameSource: Send + 'static {
    /// 等待一帧，超时返回 `Ok(None)`
    ///
    /// 带超时的阻塞接收：接收线程依赖超时定期检查停止标志。
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<Option<usize>>;
}

/// 真实 UDP 链路
///
/// 出站套接字绑定临时端口、固定发往远端的控制端口；
/// 入站套接字监听遥测端口，接受任意来源的数据报。
pub struct UdpLink {
    tx: UdpSocket,
    rx: UdpSocket,
    remote: SocketAddr,
}

impl UdpLink {
    /// 打开到远端控制器的 UDP 链路
    pub fn open(remote: Ipv4Addr, recv_timeout: Duration) -> io::Result<Self> {
        let tx = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        let rx = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, TELEMETRY_PORT))?;
        rx.set_read_timeout(Some(recv_timeout))?;

        Ok(Self {
            tx,
            rx,
            remote: SocketAddr::V4(SocketAddrV4::new(remote, CONTROL_PORT)),
        })
    }

    /// 拆分为独立的发送半部和接收半部，供发送线程与接收线程分别持有
    pub fn split(self) -> (UdpSink, UdpSource) {
        (
            UdpSink {
                socket: self.tx,
                remote: self.remote,
            },
            UdpSource { socket: self.rx },
        )
    }
}

/// UDP 发送半部
pub struct UdpSink {
    socket: UdpSocket,
    remote: SocketAddr,
}

impl FrameSink for UdpSink {
    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        self.socket.send_to(frame, self.remote)?;
        Ok(())
    }
}

/// UDP 接收半部
pub struct UdpSource {
    socket: UdpSocket,
}

impl FrameSource for UdpSource {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        match self.socket.recv_from(buf) {
            Ok((n, _from)) => Ok(Some(n)),
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::TimedOut =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
