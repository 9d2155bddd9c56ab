//! GeoIP 服务模块
//!
//! IP 地址到 country/region/city 的查询。
//! 查询失败或未配置数据库时各字段回落为 Unknown（由调用方处理）。

mod maxmind;
mod provider;

pub use provider::{GeoInfo, GeoIpLookup, GeoIpProvider};
