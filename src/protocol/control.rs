//! 控制帧结构体定义与编码
//!
//! 包含出站控制状态 `ControlState` 及其编码函数
//! [`encode_control_frame`]。编码是确定性的纯函数：
//! 同一个 `ControlState`（含序列号）永远产生完全相同的字节。

use crate::protocol::{ProtocolError, constants::*, u16_to_bytes_be};
use crc::{CRC_32_ISO_HDLC, Crc};
use std::str::FromStr;

/// 控制帧尾部使用的 CRC-32 算法（ISO-HDLC，即常见的 zlib/PNG CRC32）
const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

// ============================================================================
// 运行模式
// ============================================================================

/// 运行模式
///
/// 每个模式映射到一个固定的控制字节值（见 `constants.rs` 模式表）。
/// 不变量：任意时刻有且只有一个激活模式。
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// 禁用（默认）
    #[default]
    Disabled = MODE_DISABLED,
    /// 手动遥控
    Teleoperated = MODE_TELEOPERATED,
    /// 自主运行
    Autonomous = MODE_AUTONOMOUS,
    /// 测试模式
    Test = MODE_TEST,
    /// 软重启控制器
    SoftReboot = MODE_SOFT_REBOOT,
    /// 急停
    EmergencyStopped = MODE_EMERGENCY_STOPPED,
}

impl Mode {
    /// 模式对应的控制字节值
    pub fn byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Mode {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            MODE_DISABLED => Ok(Mode::Disabled),
            MODE_TELEOPERATED => Ok(Mode::Teleoperated),
            MODE_AUTONOMOUS => Ok(Mode::Autonomous),
            MODE_TEST => Ok(Mode::Test),
            MODE_SOFT_REBOOT => Ok(Mode::SoftReboot),
            MODE_EMERGENCY_STOPPED => Ok(Mode::EmergencyStopped),
            _ => Err(ProtocolError::UnknownMode {
                name: format!("0x{value:02X}"),
            }),
        }
    }
}

impl FromStr for Mode {
    type Err = ProtocolError;

    /// 按固定模式表解析模式名；表外名字返回 [`ProtocolError::UnknownMode`]。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Disabled" => Ok(Mode::Disabled),
            "Teleoperated" => Ok(Mode::Teleoperated),
            "Autonomous" => Ok(Mode::Autonomous),
            "Test" => Ok(Mode::Test),
            "SoftReboot" => Ok(Mode::SoftReboot),
            "EmergencyStopped" => Ok(Mode::EmergencyStopped),
            _ => Err(ProtocolError::UnknownMode { name: s.to_string() }),
        }
    }
}

// ============================================================================
// 控制状态
// ============================================================================

/// 单个摇杆槽位：6 个有符号定点轴值 + 16 位按键掩码
///
/// 未接入的槽位保持默认（全零），编码后即为全零块。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoystickState {
    pub axes: [i8; STICK_AXES],
    pub buttons: u16,
}

/// 出站控制状态——所有被发送内容的唯一事实来源
///
/// 进程启动时创建一次，仅由链路循环线程持有和修改；
/// 遥测数据永远不会被合并回本结构体。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    /// 帧序列号，每发出一帧递增一次，65536 回绕
    pub sequence: u16,
    /// 当前运行模式
    pub mode: Mode,
    /// 数字输入字节（协议不透明字段）
    pub digital_in: u8,
    /// 目标设备编号
    pub unit_id: u16,
    /// 联盟字节（协议不透明字段）
    pub alliance: u8,
    /// 位置字节（协议不透明字段）
    pub position: u8,
    /// 四个摇杆槽位
    pub sticks: [JoystickState; STICK_SLOTS],
    /// 四个模拟通道读数
    pub analog: [u16; ANALOG_CHANNELS],
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            sequence: 0,
            mode: Mode::Disabled,
            digital_in: DEFAULT_DIGITAL_IN,
            unit_id: 0,
            alliance: ALLIANCE_RED,
            position: POSITION_1,
            sticks: [JoystickState::default(); STICK_SLOTS],
            analog: [0; ANALOG_CHANNELS],
        }
    }
}

impl ControlState {
    /// 推进序列号（65536 回绕）
    pub fn next_sequence(&mut self) {
        self.sequence = self.sequence.wrapping_add(1);
    }
}

// ============================================================================
// 编码
// ============================================================================

/// 把控制状态编码为一个定长控制帧
///
/// 布局：头部（序列号、控制字节、数字输入、设备编号、联盟、位置）、
/// 四个定宽摇杆块、四个模拟通道，零填充至定长，
/// 最后 4 字节写入覆盖前 1020 字节的 CRC-32 校验。
pub fn encode_control_frame(state: &ControlState) -> [u8; CONTROL_FRAME_LEN] {
    let mut frame = [0u8; CONTROL_FRAME_LEN];

    frame[CTRL_OFF_SEQUENCE..CTRL_OFF_SEQUENCE + 2]
        .copy_from_slice(&u16_to_bytes_be(state.sequence));
    frame[CTRL_OFF_CONTROL] = state.mode.byte();
    frame[CTRL_OFF_DIGITAL_IN] = state.digital_in;
    frame[CTRL_OFF_UNIT_ID..CTRL_OFF_UNIT_ID + 2].copy_from_slice(&u16_to_bytes_be(state.unit_id));
    frame[CTRL_OFF_ALLIANCE] = state.alliance;
    frame[CTRL_OFF_POSITION] = state.position;

    for (slot, stick) in state.sticks.iter().enumerate() {
        let base = CTRL_OFF_STICKS + slot * STICK_BLOCK_LEN;
        for (i, axis) in stick.axes.iter().enumerate() {
            frame[base + i] = *axis as u8;
        }
        frame[base + STICK_AXES..base + STICK_BLOCK_LEN]
            .copy_from_slice(&u16_to_bytes_be(stick.buttons));
    }

    for (channel, value) in state.analog.iter().enumerate() {
        let off = CTRL_OFF_ANALOG + channel * 2;
        frame[off..off + 2].copy_from_slice(&u16_to_bytes_be(*value));
    }

    // 尾部 4 字节：对校验区之前的全部字节计算 CRC-32
    let crc = CRC32.checksum(&frame[..CTRL_OFF_CRC]);
    frame[CTRL_OFF_CRC..].copy_from_slice(&crc.to_be_bytes());

    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_byte_table() {
        assert_eq!(Mode::Disabled.byte(), 0x40);
        assert_eq!(Mode::Teleoperated.byte(), 0x60);
        assert_eq!(Mode::Autonomous.byte(), 0x70);
        assert_eq!(Mode::Test.byte(), 0x62);
        assert_eq!(Mode::SoftReboot.byte(), 0xC0);
        assert_eq!(Mode::EmergencyStopped.byte(), 0x00);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Autonomous".parse::<Mode>().unwrap(), Mode::Autonomous);
        assert_eq!("Disabled".parse::<Mode>().unwrap(), Mode::Disabled);

        let err = "NotAMode".parse::<Mode>().unwrap_err();
        assert_eq!(
            err,
            ProtocolError::UnknownMode {
                name: "NotAMode".to_string()
            }
        );
    }

    #[test]
    fn test_mode_byte_roundtrip() {
        for mode in [
            Mode::Disabled,
            Mode::Teleoperated,
            Mode::Autonomous,
            Mode::Test,
            Mode::SoftReboot,
            Mode::EmergencyStopped,
        ] {
            assert_eq!(Mode::try_from(mode.byte()).unwrap(), mode);
        }
        assert!(Mode::try_from(0xFF).is_err());
    }

    #[test]
    fn test_encode_header_layout() {
        let state = ControlState {
            sequence: 0x1234,
            mode: Mode::Teleoperated,
            unit_id: 178,
            ..Default::default()
        };
        let frame = encode_control_frame(&state);

        assert_eq!(&frame[0..2], &[0x12, 0x34]);
        assert_eq!(frame[2], 0x60);
        assert_eq!(frame[3], 0xFF);
        assert_eq!(&frame[4..6], &[0x00, 0xB2]);
        assert_eq!(frame[6], ALLIANCE_RED);
        assert_eq!(frame[7], POSITION_1);
    }

    #[test]
    fn test_encode_stick_and_analog_layout() {
        let mut state = ControlState::default();
        state.sticks[1] = JoystickState {
            axes: [1, -2, 3, -4, 5, -6],
            buttons: 0xA55A,
        };
        state.analog[3] = 0x0102;
        let frame = encode_control_frame(&state);

        // 槽位 1 在 16..24
        assert_eq!(&frame[16..22], &[1, 0xFE, 3, 0xFC, 5, 0xFA]);
        assert_eq!(&frame[22..24], &[0xA5, 0x5A]);
        // 槽位 0 未设置，保持全零
        assert_eq!(&frame[8..16], &[0u8; 8]);
        // 模拟通道 3 在 46..48
        assert_eq!(&frame[46..48], &[0x01, 0x02]);
    }

    #[test]
    fn test_encode_deterministic() {
        let state = ControlState {
            sequence: 42,
            unit_id: 178,
            mode: Mode::Autonomous,
            ..Default::default()
        };
        assert_eq!(encode_control_frame(&state), encode_control_frame(&state));
    }

    #[test]
    fn test_crc_trailer_matches_body() {
        let state = ControlState {
            sequence: 7,
            unit_id: 5990,
            ..Default::default()
        };
        let frame = encode_control_frame(&state);
        let expected = CRC32.checksum(&frame[..CTRL_OFF_CRC]);
        assert_eq!(&frame[CTRL_OFF_CRC..], &expected.to_be_bytes());
    }

    #[test]
    fn test_crc_detects_single_bit_flip() {
        let frame = encode_control_frame(&ControlState::default());

        // 翻转校验区之前的任意一位而不更新尾部，重算必然不匹配
        for bit_pos in [0usize, 17, 2 * 8 + 5, 1019 * 8 + 7] {
            let mut corrupted = frame;
            corrupted[bit_pos / 8] ^= 1 << (bit_pos % 8);
            let recomputed = CRC32.checksum(&corrupted[..CTRL_OFF_CRC]);
            assert_ne!(
                &corrupted[CTRL_OFF_CRC..],
                &recomputed.to_be_bytes(),
                "bit {bit_pos} flip went undetected"
            );
        }
    }

    #[test]
    fn test_sequence_wraps() {
        let mut state = ControlState {
            sequence: u16::MAX,
            ..Default::default()
        };
        state.next_sequence();
        assert_eq!(state.sequence, 0);
    }
}
