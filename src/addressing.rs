//! 设备编号到网络地址的解析
//!
//! 历史 10.TE.AM.2 编址方案：编号 178 → 10.1.78.2，编号 5990 → 10.59.90.2。
//! 两个函数都是纯函数、同步执行，是链路控制器的外部协作者。

use std::net::Ipv4Addr;

/// 编址方案接受的最小设备编号
pub const UNIT_ID_MIN: u16 = 1;
/// 编址方案接受的最大设备编号（TE.AM 各占两位十进制数）
pub const UNIT_ID_MAX: u16 = 9999;

/// 校验设备编号是否落在编址方案的接受范围内
pub fn validate_unit_id(unit_id: u16) -> bool {
    (UNIT_ID_MIN..=UNIT_ID_MAX).contains(&unit_id)
}

/// 把设备编号解析为控制器的 IPv4 地址（10.TE.AM.2）
///
/// 调用前必须先通过 [`validate_unit_id`] 校验。
pub fn resolve_address(unit_id: u16) -> Ipv4Addr {
    Ipv4Addr::new(10, (unit_id / 100) as u8, (unit_id % 100) as u8, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_unit_id() {
        assert!(!validate_unit_id(0));
        assert!(validate_unit_id(1));
        assert!(validate_unit_id(178));
        assert!(validate_unit_id(9999));
        assert!(!validate_unit_id(10000));
    }

    #[test]
    fn test_resolve_address_scheme() {
        assert_eq!(resolve_address(178), Ipv4Addr::new(10, 1, 78, 2));
        assert_eq!(resolve_address(5990), Ipv4Addr::new(10, 59, 90, 2));
        assert_eq!(resolve_address(1), Ipv4Addr::new(10, 0, 1, 2));
        assert_eq!(resolve_address(9999), Ipv4Addr::new(10, 99, 99, 2));
    }
}
