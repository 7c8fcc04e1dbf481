//! 遥测帧解析
//!
//! 入站遥测帧先按固定偏移读出标量字段，再顺序读取三个
//! 带长度前缀的变长段，最后在帧内固定偏移处读取显示文本区。
//! 变长段的偏移是前向链式推进的：长度前缀损坏会级联破坏后续
//! 所有偏移，因此每一个计算出的边界都必须对照缓冲区长度做检查，
//! 宁可返回 [`ProtocolError::TruncatedFrame`] 也不读出界。

use crate::protocol::{ProtocolError, bytes_to_u16_be, bytes_to_u32_be, constants::*};

/// 单帧遥测记录
///
/// 每收到一个数据报就新建一份，不保留历史；除链路层的
/// 连接/丢包簿记外，任何字段都不会回写进 `ControlState`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryRecord {
    /// 控制回显字节
    pub control: u8,
    /// 电池电压整数位原始字节（十六进制数字对）
    pub battery_major: u8,
    /// 电池电压小数位原始字节
    pub battery_minor: u8,
    /// 数字输出字节
    pub digital_out: u8,
    /// 用户代码状态字节
    pub code_state: u8,
    /// 控制器上报的设备编号
    pub unit_id: u16,
    /// 硬件地址
    pub mac: [u8; MAC_LEN],
    /// 入站序列号
    pub sequence: u16,
    /// 更新计数
    pub update_count: u32,
    /// 变长段：用户数据（高优先级）
    pub user_data_high: Vec<u8>,
    /// 变长段：错误文本
    pub error_text: Vec<u8>,
    /// 变长段：用户数据（低优先级）
    pub user_data_low: Vec<u8>,
    /// 显示文本区（6 行 × 21 字符）
    pub display: [u8; DISPLAY_LEN],
    /// 控制器上是否有用户代码在运行（由状态字节区间判定导出）
    pub has_robot_code: bool,
}

impl TelemetryRecord {
    /// 电池电压
    ///
    /// 原始字节按"十六进制数字当十进制读"的历史变换折算：
    /// `0x12 0x34` → 12.34V。上游未给出真实标定，保持该文档化变换不动。
    pub fn battery_voltage(&self) -> f32 {
        f32::from(hex_digits_as_decimal(self.battery_major))
            + f32::from(hex_digits_as_decimal(self.battery_minor)) / 100.0
    }

    /// 按行迭代显示文本区
    pub fn display_lines(&self) -> impl Iterator<Item = &[u8]> {
        self.display.chunks_exact(DISPLAY_LINE_LEN)
    }
}

/// 把一个字节的两个十六进制数字串接后当十进制数值读
fn hex_digits_as_decimal(byte: u8) -> u8 {
    (byte >> 4) * 10 + (byte & 0x0F)
}

/// 读取一个变长段并返回（段内容，下一段起始偏移）
///
/// 每段前置 u32 大端长度；起始偏移即上一段的结束偏移。
fn read_segment(buf: &[u8], offset: usize) -> Result<(Vec<u8>, usize), ProtocolError> {
    let body = offset
        .checked_add(SEGMENT_LEN_PREFIX)
        .ok_or(ProtocolError::TruncatedFrame {
            offset,
            end: usize::MAX,
            len: buf.len(),
        })?;
    if body > buf.len() {
        return Err(ProtocolError::TruncatedFrame {
            offset,
            end: body,
            len: buf.len(),
        });
    }

    let seg_len =
        bytes_to_u32_be([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]]) as usize;
    let end = body.checked_add(seg_len).ok_or(ProtocolError::TruncatedFrame {
        offset: body,
        end: usize::MAX,
        len: buf.len(),
    })?;
    if end > buf.len() {
        return Err(ProtocolError::TruncatedFrame {
            offset: body,
            end,
            len: buf.len(),
        });
    }

    Ok((buf[body..end].to_vec(), end))
}

/// 解码一帧遥测数据
///
/// 纯函数：不修改任何共享状态。失败只影响当前数据报，
/// 对连接本身是非致命的。
pub fn decode_telemetry_frame(buf: &[u8]) -> Result<TelemetryRecord, ProtocolError> {
    if buf.len() < TELEMETRY_HEADER_LEN {
        return Err(ProtocolError::MalformedFrame {
            len: buf.len(),
            min: TELEMETRY_HEADER_LEN,
        });
    }

    let mut mac = [0u8; MAC_LEN];
    mac.copy_from_slice(&buf[TLM_OFF_MAC..TLM_OFF_MAC + MAC_LEN]);

    let code_state = buf[TLM_OFF_CODE_STATE];

    // 三个变长段严格顺序解析，逐段校验边界
    let (user_data_high, next) = read_segment(buf, TLM_OFF_SEGMENTS)?;
    let (error_text, next) = read_segment(buf, next)?;
    let (user_data_low, _) = read_segment(buf, next)?;

    // 显示区按帧内固定偏移读取，与变长段的实际结束位置无关（历史格式如此）
    let display_end = TLM_OFF_DISPLAY + DISPLAY_LEN;
    if display_end > buf.len() {
        return Err(ProtocolError::TruncatedFrame {
            offset: TLM_OFF_DISPLAY,
            end: display_end,
            len: buf.len(),
        });
    }
    let mut display = [0u8; DISPLAY_LEN];
    display.copy_from_slice(&buf[TLM_OFF_DISPLAY..display_end]);

    Ok(TelemetryRecord {
        control: buf[TLM_OFF_CONTROL],
        battery_major: buf[TLM_OFF_BATTERY_MAJOR],
        battery_minor: buf[TLM_OFF_BATTERY_MINOR],
        digital_out: buf[TLM_OFF_DIGITAL_OUT],
        code_state,
        unit_id: bytes_to_u16_be([buf[TLM_OFF_UNIT_ID], buf[TLM_OFF_UNIT_ID + 1]]),
        mac,
        sequence: bytes_to_u16_be([buf[TLM_OFF_SEQUENCE], buf[TLM_OFF_SEQUENCE + 1]]),
        update_count: bytes_to_u32_be([
            buf[TLM_OFF_UPDATE_COUNT],
            buf[TLM_OFF_UPDATE_COUNT + 1],
            buf[TLM_OFF_UPDATE_COUNT + 2],
            buf[TLM_OFF_UPDATE_COUNT + 3],
        ]),
        user_data_high,
        error_text,
        user_data_low,
        display,
        has_robot_code: (ROBOT_CODE_MIN..=ROBOT_CODE_MAX).contains(&code_state),
    })
}
