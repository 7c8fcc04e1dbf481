//! 通道背书的 mock 传输
//!
//! 不依赖真实套接字即可驱动整条链路，用于场景测试和无硬件演示：
//! 测试端从 `sent` 一侧观察控制器发出的每一帧，
//! 通过 `inject` 一侧注入任意入站字节。

use super::{FrameSink, FrameSource};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use std::io;
use std::time::Duration;

/// Mock 发送半部：发出的帧原样进入测试端的接收通道
pub struct MockSink {
    tx: Sender<Vec<u8>>,
}

/// Mock 接收半部：从测试端的注入通道取帧
pub struct MockSource {
    rx: Receiver<Vec<u8>>,
    timeout: Duration,
}

/// 测试端握持的两个通道口
pub struct MockHarness {
    /// 控制器发出的帧
    pub sent: Receiver<Vec<u8>>,
    /// 注入给控制器的入站帧
    pub inject: Sender<Vec<u8>>,
}

/// 建立一对互联的 mock 传输半部和对应的测试端
pub fn pair(recv_timeout: Duration) -> (MockSink, MockSource, MockHarness) {
    let (sent_tx, sent_rx) = unbounded();
    let (inject_tx, inject_rx) = unbounded();

    (
        MockSink { tx: sent_tx },
        MockSource {
            rx: inject_rx,
            timeout: recv_timeout,
        },
        MockHarness {
            sent: sent_rx,
            inject: inject_tx,
        },
    )
}

impl FrameSink for MockSink {
    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        // 测试端已丢弃接收口时模拟"目的地不可达"，帧被丢弃
        self.tx
            .send(frame.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::NotConnected, "mock peer gone"))
    }
}

impl FrameSource for MockSource {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        match self.rx.recv_timeout(self.timeout) {
            Ok(frame) => {
                let n = frame.len().min(buf.len());
                buf[..n].copy_from_slice(&frame[..n]);
                Ok(Some(n))
            }
            // 注入口被丢弃后等同于一条永远安静的链路
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => Ok(None),
        }
    }
}
