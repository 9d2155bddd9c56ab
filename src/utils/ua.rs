//! User-Agent 解析
//!
//! 用 woothee 解析 OS 与设备类别。解析不出来时回落为
//! "Unknown" / "Desktop"，绝不让坏 UA 影响请求。

use woothee::parser::Parser;

pub const UNKNOWN_OS: &str = "Unknown";
pub const DEFAULT_DEVICE: &str = "Desktop";

/// 访问行需要的 UA 维度
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgentInfo {
    pub os: String,
    pub device: String,
}

impl Default for UserAgentInfo {
    fn default() -> Self {
        Self {
            os: UNKNOWN_OS.to_string(),
            device: DEFAULT_DEVICE.to_string(),
        }
    }
}

/// 把 woothee 的 category 收敛到分析用的设备类别
fn device_from_category(category: &str) -> &'static str {
    match category {
        "smartphone" | "mobilephone" => "Mobile",
        "appliance" => "Appliance",
        "crawler" => "Crawler",
        // pc / misc / unknown
        _ => DEFAULT_DEVICE,
    }
}

pub fn parse_user_agent(ua_string: &str) -> UserAgentInfo {
    if ua_string.is_empty() {
        return UserAgentInfo::default();
    }

    let parser = Parser::new();
    let Some(result) = parser.parse(ua_string) else {
        return UserAgentInfo::default();
    };

    let os = if result.os != "UNKNOWN" && !result.os.is_empty() {
        result.os.to_string()
    } else {
        UNKNOWN_OS.to_string()
    };

    UserAgentInfo {
        os,
        device: device_from_category(result.category).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1";

    #[test]
    fn test_desktop_browser() {
        let info = parse_user_agent(CHROME_WINDOWS);
        assert_eq!(info.device, "Desktop");
        assert_ne!(info.os, UNKNOWN_OS);
    }

    #[test]
    fn test_mobile_browser() {
        let info = parse_user_agent(SAFARI_IPHONE);
        assert_eq!(info.device, "Mobile");
    }

    #[test]
    fn test_empty_ua_defaults() {
        let info = parse_user_agent("");
        assert_eq!(info.os, "Unknown");
        assert_eq!(info.device, "Desktop");
    }

    #[test]
    fn test_garbage_ua_defaults() {
        let info = parse_user_agent("definitely-not-a-browser");
        assert_eq!(info.os, "Unknown");
        assert_eq!(info.device, "Desktop");
    }
}
