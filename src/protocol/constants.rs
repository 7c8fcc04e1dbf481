//! 协议常量定义
//!
//! 集中定义所有线格式相关的常量，避免在代码中散落"魔法数"。
//! 任何偏移量的改动都是破坏协议兼容性的变更。

// ============================================================================
// 端口
// ============================================================================

/// 出站控制帧的目标 UDP 端口（驾驶站 → 控制器）
pub const CONTROL_PORT: u16 = 1110;

/// 入站遥测帧的监听 UDP 端口（控制器 → 驾驶站）
pub const TELEMETRY_PORT: u16 = 1150;

// ============================================================================
// 控制帧（出站）布局
// ============================================================================

/// 控制帧固定总长
pub const CONTROL_FRAME_LEN: usize = 1024;

/// 序列号偏移（u16）
pub const CTRL_OFF_SEQUENCE: usize = 0;
/// 控制字节（模式）偏移
pub const CTRL_OFF_CONTROL: usize = 2;
/// 数字输入字节偏移
pub const CTRL_OFF_DIGITAL_IN: usize = 3;
/// 目标设备编号偏移（u16）
pub const CTRL_OFF_UNIT_ID: usize = 4;
/// 联盟字节偏移
pub const CTRL_OFF_ALLIANCE: usize = 6;
/// 位置字节偏移
pub const CTRL_OFF_POSITION: usize = 7;
/// 第一个摇杆块的偏移
pub const CTRL_OFF_STICKS: usize = 8;
/// 单个摇杆块长度：6 字节轴 + u16 按键掩码
pub const STICK_BLOCK_LEN: usize = 8;
/// 摇杆槽位数
pub const STICK_SLOTS: usize = 4;
/// 每个摇杆的轴数
pub const STICK_AXES: usize = 6;
/// 模拟通道区偏移（4 × u16）
pub const CTRL_OFF_ANALOG: usize = 40;
/// 模拟通道数
pub const ANALOG_CHANNELS: usize = 4;
/// CRC-32 尾部偏移（覆盖 0..CTRL_OFF_CRC 的全部字节）
pub const CTRL_OFF_CRC: usize = CONTROL_FRAME_LEN - 4;

// ============================================================================
// 控制字节位标志与模式表
// ============================================================================

/// 软重启位
pub const RESET_BIT: u8 = 0x80;
/// 急停位（置位表示未急停）
pub const ESTOP_BIT: u8 = 0x40;
/// 使能位
pub const ENABLED_BIT: u8 = 0x20;
/// 自主模式位
pub const AUTONOMOUS_BIT: u8 = 0x10;
/// FMS 在场位
pub const FMS_ATTACHED_BIT: u8 = 0x08;
/// 重新同步位
pub const RESYNCH_BIT: u8 = 0x04;
/// 测试模式位
pub const TEST_MODE_BIT: u8 = 0x02;
/// 版本检查位
pub const CHECK_VERSIONS_BIT: u8 = 0x01;

/// 模式字节值：Disabled
pub const MODE_DISABLED: u8 = ESTOP_BIT;
/// 模式字节值：Teleoperated
pub const MODE_TELEOPERATED: u8 = ESTOP_BIT | ENABLED_BIT;
/// 模式字节值：Autonomous
pub const MODE_AUTONOMOUS: u8 = ESTOP_BIT | ENABLED_BIT | AUTONOMOUS_BIT;
/// 模式字节值：Test
pub const MODE_TEST: u8 = ESTOP_BIT | ENABLED_BIT | TEST_MODE_BIT;
/// 模式字节值：SoftReboot
pub const MODE_SOFT_REBOOT: u8 = RESET_BIT | ESTOP_BIT;
/// 模式字节值：EmergencyStopped（急停位清零即为急停）
pub const MODE_EMERGENCY_STOPPED: u8 = 0x00;

// ============================================================================
// 控制帧默认字段值
// ============================================================================

/// 数字输入默认值（全部高电平）
pub const DEFAULT_DIGITAL_IN: u8 = 0xFF;
/// 联盟字节：红方（'R'）
pub const ALLIANCE_RED: u8 = 0x52;
/// 联盟字节：蓝方（'B'）
pub const ALLIANCE_BLUE: u8 = 0x42;
/// 位置字节：1 号位（'1'）
pub const POSITION_1: u8 = 0x31;
/// 位置字节：2 号位（'2'）
pub const POSITION_2: u8 = 0x32;
/// 位置字节：3 号位（'3'）
pub const POSITION_3: u8 = 0x33;

// ============================================================================
// 遥测帧（入站）布局
// ============================================================================

/// 遥测帧的标称总长
pub const TELEMETRY_FRAME_LEN: usize = 1024;

/// 控制回显字节偏移
pub const TLM_OFF_CONTROL: usize = 0;
/// 电池电压整数位字节偏移（十六进制数字对）
pub const TLM_OFF_BATTERY_MAJOR: usize = 1;
/// 电池电压小数位字节偏移
pub const TLM_OFF_BATTERY_MINOR: usize = 2;
/// 数字输出字节偏移
pub const TLM_OFF_DIGITAL_OUT: usize = 3;
/// 用户代码状态字节偏移
pub const TLM_OFF_CODE_STATE: usize = 4;
/// 上报设备编号偏移（u16）
pub const TLM_OFF_UNIT_ID: usize = 6;
/// 硬件地址偏移（6 字节）
pub const TLM_OFF_MAC: usize = 8;
/// 硬件地址长度
pub const MAC_LEN: usize = 6;
/// 入站序列号偏移（u16）
pub const TLM_OFF_SEQUENCE: usize = 14;
/// 更新计数偏移（u32）
pub const TLM_OFF_UPDATE_COUNT: usize = 16;
/// 固定头部最小长度；低于此长度的帧视为畸形帧
pub const TELEMETRY_HEADER_LEN: usize = 20;
/// 变长段区起始偏移（三段依次：user-data-high、error-text、user-data-low，
/// 每段前置 u32 大端长度）
pub const TLM_OFF_SEGMENTS: usize = TELEMETRY_HEADER_LEN;
/// 每段长度前缀的字节数
pub const SEGMENT_LEN_PREFIX: usize = 4;

/// 显示文本区偏移——相对帧首固定，不随变长段实际结束位置移动
pub const TLM_OFF_DISPLAY: usize = 896;
/// 显示文本区长度：6 行 × 21 字符
pub const DISPLAY_LEN: usize = 126;
/// 显示文本行数
pub const DISPLAY_LINES: usize = 6;
/// 显示文本每行字符数
pub const DISPLAY_LINE_LEN: usize = 21;

/// 用户代码状态字节的"有代码"判定区间（闭区间下界）
pub const ROBOT_CODE_MIN: u8 = 0x30;
/// 用户代码状态字节的"有代码"判定区间（闭区间上界）
pub const ROBOT_CODE_MAX: u8 = 0x38;
