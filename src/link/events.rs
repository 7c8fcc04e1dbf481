//! 链路事件与订阅
//!
//! 用显式类型化的订阅接口取代原实现里"继承 EventEmitter"的动态模式：
//! 每个订阅者一条无界通道，广播时逐个克隆投递，掉线的订阅者被剔除。

use crate::error::LinkError;
use crate::protocol::TelemetryRecord;
use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;
use std::sync::Arc;

/// 可观察的链路事件
#[derive(Debug, Clone)]
pub enum LinkEvent {
    /// 搜索 → 激活 提升时发出，每次提升恰好一次
    Connected,
    /// 激活 → 搜索 降级或显式 stop() 时发出
    Disconnected,
    /// 连接窗口内没有收到任何遥测帧，每次失败的连接尝试恰好一次，
    /// 随事件携带对应的 [`LinkError::ConnectTimeout`]
    ConnectTimeout(Arc<LinkError>),
    /// 每成功解码一帧遥测发出一次
    Telemetry(Arc<TelemetryRecord>),
}

/// 事件广播总线，允许任意数量的订阅者
#[derive(Default)]
pub(crate) struct EventBus {
    subscribers: Mutex<Vec<Sender<LinkEvent>>>,
}

impl EventBus {
    /// 新增一个订阅者
    pub(crate) fn subscribe(&self) -> Receiver<LinkEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// 向所有订阅者广播一个事件；接收端已丢弃的订阅者顺带剔除
    pub(crate) fn publish(&self, event: LinkEvent) {
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_out_to_all_subscribers() {
        let bus = EventBus::default();
        let a = bus.subscribe();
        let b = bus.subscribe();

        bus.publish(LinkEvent::Connected);

        assert!(matches!(a.recv().unwrap(), LinkEvent::Connected));
        assert!(matches!(b.recv().unwrap(), LinkEvent::Connected));
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let bus = EventBus::default();
        let a = bus.subscribe();
        drop(bus.subscribe());

        bus.publish(LinkEvent::Disconnected);
        bus.publish(LinkEvent::Connected);

        assert_eq!(a.len(), 2);
        assert_eq!(bus.subscribers.lock().len(), 1);
    }
}
