//! 链路控制器
//!
//! 持有连接状态、驱动出站发送节拍、检测超时和连续丢包，并对外
//! 暴露生命周期事件。
//!
//! # 并发不变量
//!
//! `ControlState` 和连接相位只存在于链路循环线程的栈上。
//! 接收线程解码后的遥测记录和 API 调用方的设置命令都通过同一条
//! 通道投递进该线程，因此入站帧处理与定时发送对状态的修改互斥——
//! 这是设计约束，不是调度巧合。所有 setter 立即返回，发送失败只
//! 记录日志，绝不回传给调用方。
//!
//! # 状态机
//!
//! - **Connecting**：`start()` 进入。快节拍发送，连接窗口倒计时。
//!   收到遥测 → Active；窗口耗尽 → 发出一次 `ConnectTimeout`，降级 Searching。
//! - **Searching**：慢节拍发送。收到遥测 → Active（发出一次 `Connected`）。
//! - **Active**：每个节拍先把丢包计数 +1 再发送；每帧解码成功的遥测
//!   把计数清零。计数超过阈值 → 发出一次 `Disconnected`，降级 Searching。
//!
//! 解码失败的数据报只记录日志：不清零计数、不提升相位。
//! 离开相位时先替换该相位的节拍/倒计时再生效下一相位的，
//! 不存在并发的重复发送循环。

use crate::addressing::{resolve_address, validate_unit_id};
use crate::error::LinkError;
use crate::link::events::{EventBus, LinkEvent};
use crate::link::state::{LinkStatus, Phase, StatusCell};
use crate::link::{CONNECT_TIMEOUT_TICKS, MISSED_PACKET_THRESHOLD, SEARCH_INTERVAL_TICKS};
use crate::protocol::{
    ANALOG_CHANNELS, ControlState, JoystickState, Mode, STICK_SLOTS, TELEMETRY_FRAME_LEN,
    TelemetryRecord, decode_telemetry_frame, encode_control_frame,
};
use crate::transport::{FrameSink, FrameSource, UdpLink};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// 链路配置
///
/// # Example
///
/// ```
/// use frcds_link::LinkConfig;
/// use std::time::Duration;
///
/// // 默认 20ms 基准节拍（50Hz）
/// let config = LinkConfig::new(178);
///
/// // 测试中常用缩短的节拍
/// let config = LinkConfig {
///     base_tick: Duration::from_millis(5),
///     ..LinkConfig::new(178)
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// 目标设备编号（必填；0 不在编址方案内）
    pub unit_id: u16,
    /// 联盟字节
    pub alliance: u8,
    /// 位置字节
    pub position: u8,
    /// 基准节拍；快节拍 = 1 拍，慢节拍 = 50 拍，连接窗口 = 5 拍
    pub base_tick: Duration,
    /// 接收线程的单次等待超时（兼作停止标志的检查周期）
    pub recv_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            unit_id: 0,
            alliance: crate::protocol::ALLIANCE_RED,
            position: crate::protocol::POSITION_1,
            base_tick: Duration::from_millis(20),
            recv_timeout: Duration::from_millis(20),
        }
    }
}

impl LinkConfig {
    /// 以默认联盟/位置/节拍构造指定设备编号的配置
    pub fn new(unit_id: u16) -> Self {
        Self {
            unit_id,
            ..Default::default()
        }
    }
}

/// 投递给链路循环的设置命令
enum Command {
    SetMode(Mode),
    SetJoystick(usize, JoystickState),
    SetAnalog(usize, u16),
    SetDigitalIn(u8),
    Stop,
}

/// 链路循环的统一入站消息：单消费者即串行化
enum Msg {
    Cmd(Command),
    Inbound(Arc<TelemetryRecord>),
}

/// 链路循环线程与 API 侧共享的句柄
struct Shared {
    events: EventBus,
    status: StatusCell,
    running: AtomicBool,
}

/// 链路控制器
///
/// `start()` 后即拥有两个后台线程（接收线程、链路循环线程）；
/// `stop()` 幂等，`Drop` 时自动调用。
pub struct LinkController {
    msg_tx: Sender<Msg>,
    shared: Arc<Shared>,
    stopped: AtomicBool,
    loop_thread: Mutex<Option<JoinHandle<()>>>,
    rx_thread: Mutex<Option<JoinHandle<()>>>,
}

impl LinkController {
    /// 校验设备编号、解析远端地址并启动链路
    ///
    /// 编号不合法时返回 [`LinkError::Validation`]，不会启动任何定时器或线程。
    pub fn start(config: LinkConfig) -> Result<Self, LinkError> {
        if !validate_unit_id(config.unit_id) {
            return Err(LinkError::Validation {
                unit_id: config.unit_id,
            });
        }
        let remote = resolve_address(config.unit_id);
        let (sink, source) = UdpLink::open(remote, config.recv_timeout)?.split();
        Self::start_with_transport(sink, source, config)
    }

    /// 用注入的传输半部启动链路（测试与无硬件演示用）
    pub fn start_with_transport<S, R>(
        sink: S,
        source: R,
        config: LinkConfig,
    ) -> Result<Self, LinkError>
    where
        S: FrameSink,
        R: FrameSource,
    {
        if !validate_unit_id(config.unit_id) {
            return Err(LinkError::Validation {
                unit_id: config.unit_id,
            });
        }

        let shared = Arc::new(Shared {
            events: EventBus::default(),
            status: StatusCell::default(),
            running: AtomicBool::new(true),
        });
        let (msg_tx, msg_rx) = unbounded();

        let rx_shared = Arc::clone(&shared);
        let rx_msg_tx = msg_tx.clone();
        let backoff = config.recv_timeout;
        let rx_thread = thread::Builder::new()
            .name("frcds-rx".into())
            .spawn(move || rx_loop(source, rx_msg_tx, rx_shared, backoff))?;

        let control = ControlState {
            unit_id: config.unit_id,
            alliance: config.alliance,
            position: config.position,
            ..Default::default()
        };
        let link_loop = LinkLoop::new(sink, msg_rx, Arc::clone(&shared), control, &config);
        let loop_thread = thread::Builder::new()
            .name("frcds-link".into())
            .spawn(move || link_loop.run())?;

        info!(unit_id = config.unit_id, "link started");

        Ok(Self {
            msg_tx,
            shared,
            stopped: AtomicBool::new(false),
            loop_thread: Mutex::new(Some(loop_thread)),
            rx_thread: Mutex::new(Some(rx_thread)),
        })
    }

    fn send_cmd(&self, cmd: Command) -> Result<(), LinkError> {
        self.msg_tx
            .send(Msg::Cmd(cmd))
            .map_err(|_| LinkError::ChannelClosed)
    }

    /// 更新出站模式字节；对连接相位没有任何影响
    pub fn set_mode(&self, mode: Mode) -> Result<(), LinkError> {
        self.send_cmd(Command::SetMode(mode))
    }

    /// 按名字设置模式
    ///
    /// 名字不在固定模式表内时返回 `UnknownMode`，原模式保持不变（非致命）。
    pub fn set_mode_by_name(&self, name: &str) -> Result<(), LinkError> {
        let mode: Mode = name.parse()?;
        self.set_mode(mode)
    }

    /// 切到禁用模式
    pub fn disable(&self) -> Result<(), LinkError> {
        self.set_mode(Mode::Disabled)
    }

    /// 急停
    pub fn estop(&self) -> Result<(), LinkError> {
        self.set_mode(Mode::EmergencyStopped)
    }

    /// 软重启控制器
    pub fn reboot(&self) -> Result<(), LinkError> {
        self.set_mode(Mode::SoftReboot)
    }

    /// 更新一个摇杆槽位
    pub fn set_joystick(&self, slot: usize, stick: JoystickState) -> Result<(), LinkError> {
        if slot >= STICK_SLOTS {
            return Err(LinkError::InvalidInput(format!(
                "joystick slot {slot} out of range (0..{STICK_SLOTS})"
            )));
        }
        self.send_cmd(Command::SetJoystick(slot, stick))
    }

    /// 更新一个模拟通道读数
    pub fn set_analog(&self, channel: usize, value: u16) -> Result<(), LinkError> {
        if channel >= ANALOG_CHANNELS {
            return Err(LinkError::InvalidInput(format!(
                "analog channel {channel} out of range (0..{ANALOG_CHANNELS})"
            )));
        }
        self.send_cmd(Command::SetAnalog(channel, value))
    }

    /// 更新数字输入字节
    pub fn set_digital_in(&self, value: u8) -> Result<(), LinkError> {
        self.send_cmd(Command::SetDigitalIn(value))
    }

    /// 当前链路状态快照（wait-free）
    pub fn status(&self) -> LinkStatus {
        self.shared.status.get()
    }

    /// 订阅链路事件；允许任意数量的订阅者
    pub fn subscribe(&self) -> Receiver<LinkEvent> {
        self.shared.events.subscribe()
    }

    /// 停止链路：取消所有定时行为、标记断连、恰好发出一次 `Disconnected`
    ///
    /// 幂等；重复调用是空操作。
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shared.running.store(false, Ordering::Relaxed);
        let _ = self.msg_tx.send(Msg::Cmd(Command::Stop));
        if let Some(handle) = self.loop_thread.lock().take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.rx_thread.lock().take() {
            let _ = handle.join();
        }
        info!("link stopped");
    }
}

impl Drop for LinkController {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// 接收线程
// ============================================================================

/// 接收线程主体：收帧、解码、投递给链路循环
///
/// 解码失败的数据报在这里丢弃（记 debug 日志），不进入链路循环，
/// 因此既不清零丢包计数也不提升相位。
fn rx_loop<R: FrameSource>(
    mut source: R,
    msg_tx: Sender<Msg>,
    shared: Arc<Shared>,
    backoff: Duration,
) {
    let mut buf = [0u8; TELEMETRY_FRAME_LEN * 2];
    while shared.running.load(Ordering::Relaxed) {
        match source.recv(&mut buf) {
            Ok(Some(n)) => match decode_telemetry_frame(&buf[..n]) {
                Ok(record) => {
                    if msg_tx.send(Msg::Inbound(Arc::new(record))).is_err() {
                        break;
                    }
                }
                Err(e) => debug!("dropping undecodable telemetry frame: {e}"),
            },
            Ok(None) => {}
            Err(e) => {
                warn!("telemetry receive failed: {e}");
                thread::sleep(backoff);
            }
        }
    }
}

// ============================================================================
// 链路循环线程
// ============================================================================

/// 链路循环的全部可变状态；仅存在于循环线程内
struct LinkLoop<S: FrameSink> {
    sink: S,
    msg_rx: Receiver<Msg>,
    shared: Arc<Shared>,

    control: ControlState,
    phase: Phase,
    connected: bool,
    missed: u32,

    /// 当前发送间隔（快节拍或慢节拍）
    interval: Duration,
    next_send: Instant,
    /// 连接窗口截止时刻；仅 Connecting 相位存在
    deadline: Option<Instant>,

    fast: Duration,
    slow: Duration,
}

impl<S: FrameSink> LinkLoop<S> {
    fn new(
        sink: S,
        msg_rx: Receiver<Msg>,
        shared: Arc<Shared>,
        control: ControlState,
        config: &LinkConfig,
    ) -> Self {
        let now = Instant::now();
        let fast = config.base_tick;
        Self {
            sink,
            msg_rx,
            shared,
            control,
            phase: Phase::Connecting,
            connected: false,
            missed: 0,
            interval: fast,
            // 第一帧立即发出
            next_send: now,
            deadline: Some(now + fast * CONNECT_TIMEOUT_TICKS),
            fast,
            slow: fast * SEARCH_INTERVAL_TICKS,
        }
    }

    fn run(mut self) {
        self.publish_status();
        loop {
            let now = Instant::now();

            if let Some(d) = self.deadline {
                if now >= d {
                    self.on_connect_deadline();
                    continue;
                }
            }
            if now >= self.next_send {
                self.on_tick(now);
                continue;
            }

            let mut wait = self.next_send - now;
            if let Some(d) = self.deadline {
                wait = wait.min(d - now);
            }
            match self.msg_rx.recv_timeout(wait) {
                Ok(Msg::Inbound(record)) => self.on_telemetry(record),
                Ok(Msg::Cmd(Command::Stop)) => {
                    self.shared.events.publish(LinkEvent::Disconnected);
                    break;
                }
                Ok(Msg::Cmd(cmd)) => self.on_command(cmd),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        // 终态：断连
        self.shared.running.store(false, Ordering::Relaxed);
        self.shared.status.set(LinkStatus::default());
    }

    /// 发送节拍：Active 相位先计丢包再发送
    fn on_tick(&mut self, now: Instant) {
        if self.phase == Phase::Active {
            self.missed += 1;
            if self.missed > MISSED_PACKET_THRESHOLD {
                info!(missed = self.missed, "telemetry lost, link demoted");
                self.missed = 0;
                self.connected = false;
                self.enter_searching(now);
                self.shared.events.publish(LinkEvent::Disconnected);
                self.publish_status();
                return;
            }
        }

        self.control.next_sequence();
        let frame = encode_control_frame(&self.control);
        if let Err(e) = self.sink.send(&frame) {
            // fire-and-forget：下一拍无状态重试
            warn!("control frame send failed: {e}");
        }

        self.next_send += self.interval;
        if self.next_send <= now {
            self.next_send = now + self.interval;
        }
        self.publish_status();
    }

    /// 成功解码的入站遥测：非 Active 相位一律提升，不验握手
    fn on_telemetry(&mut self, record: Arc<TelemetryRecord>) {
        match self.phase {
            Phase::Active => {
                self.missed = 0;
            }
            Phase::Searching | Phase::Connecting => {
                info!(unit_id = record.unit_id, "telemetry acquired, link active");
                self.phase = Phase::Active;
                self.interval = self.fast;
                self.deadline = None;
                self.missed = 0;
                self.next_send = Instant::now() + self.fast;
                self.shared.events.publish(LinkEvent::Connected);
            }
        }
        self.connected = true;
        self.publish_status();
        self.shared.events.publish(LinkEvent::Telemetry(record));
    }

    /// 连接窗口耗尽：本次连接尝试失败，退回搜索相位继续自动重试
    fn on_connect_deadline(&mut self) {
        let err = LinkError::ConnectTimeout;
        info!("{err}");
        self.deadline = None;
        self.enter_searching(Instant::now());
        self.shared
            .events
            .publish(LinkEvent::ConnectTimeout(Arc::new(err)));
        self.publish_status();
    }

    fn on_command(&mut self, cmd: Command) {
        match cmd {
            Command::SetMode(mode) => self.control.mode = mode,
            Command::SetJoystick(slot, stick) => self.control.sticks[slot] = stick,
            Command::SetAnalog(channel, value) => self.control.analog[channel] = value,
            Command::SetDigitalIn(value) => self.control.digital_in = value,
            Command::Stop => unreachable!("Stop is handled in run()"),
        }
    }

    /// 进入搜索相位：替换当前节拍为慢节拍
    fn enter_searching(&mut self, now: Instant) {
        self.phase = Phase::Searching;
        self.interval = self.slow;
        self.next_send = now + self.slow;
    }

    fn publish_status(&self) {
        self.shared.status.set(LinkStatus {
            connected: self.connected,
            missed_packets: self.missed,
            phase: self.phase,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock;

    #[test]
    fn test_config_defaults() {
        let config = LinkConfig::new(178);
        assert_eq!(config.unit_id, 178);
        assert_eq!(config.base_tick, Duration::from_millis(20));
        assert_eq!(config.alliance, crate::protocol::ALLIANCE_RED);
    }

    #[test]
    fn test_start_rejects_invalid_unit_id() {
        let (sink, source, _harness) = mock::pair(Duration::from_millis(5));
        let Err(err) = LinkController::start_with_transport(sink, source, LinkConfig::new(0))
        else {
            panic!("start accepted unit id 0");
        };
        assert!(matches!(err, LinkError::Validation { unit_id: 0 }));
    }

    #[test]
    fn test_setters_validate_ranges() {
        let (sink, source, _harness) = mock::pair(Duration::from_millis(5));
        let link = LinkController::start_with_transport(
            sink,
            source,
            LinkConfig {
                base_tick: Duration::from_millis(5),
                ..LinkConfig::new(178)
            },
        )
        .unwrap();

        assert!(matches!(
            link.set_joystick(4, JoystickState::default()),
            Err(LinkError::InvalidInput(_))
        ));
        assert!(matches!(
            link.set_analog(4, 0),
            Err(LinkError::InvalidInput(_))
        ));
        assert!(link.set_joystick(3, JoystickState::default()).is_ok());

        link.stop();
    }

    #[test]
    fn test_setters_fail_after_stop() {
        let (sink, source, _harness) = mock::pair(Duration::from_millis(5));
        let link = LinkController::start_with_transport(
            sink,
            source,
            LinkConfig {
                base_tick: Duration::from_millis(5),
                ..LinkConfig::new(178)
            },
        )
        .unwrap();

        link.stop();
        assert!(matches!(
            link.set_mode(Mode::Teleoperated),
            Err(LinkError::ChannelClosed)
        ));
    }
}
