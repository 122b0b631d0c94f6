//! Coarse user-agent classification stored with login history.
use models::login_history::DeviceInfo;

pub fn parse_user_agent(ua: &str) -> DeviceInfo {
    let browser = if ua.contains("Edg/") {
        "Edge"
    } else if ua.contains("OPR/") || ua.contains("Opera") {
        "Opera"
    } else if ua.contains("Firefox/") {
        "Firefox"
    } else if ua.contains("Chrome/") || ua.contains("CriOS/") {
        "Chrome"
    } else if ua.contains("Safari/") {
        "Safari"
    } else {
        "Unknown"
    };

    let os = if ua.contains("Windows") {
        "Windows"
    } else if ua.contains("iPhone") || ua.contains("iPad") {
        "iOS"
    } else if ua.contains("Mac OS") || ua.contains("Macintosh") {
        "macOS"
    } else if ua.contains("Android") {
        "Android"
    } else if ua.contains("Linux") {
        "Linux"
    } else {
        "Unknown"
    };

    let device = if ua.contains("iPad") || ua.contains("Tablet") {
        "Tablet"
    } else if ua.contains("Mobi") || ua.contains("iPhone") || ua.contains("Android") {
        "Mobile"
    } else {
        "Desktop"
    };

    DeviceInfo { browser: browser.into(), os: os.into(), device: device.into() }
}

#[cfg(test)]
mod tests {
    use super::parse_user_agent;

    #[test]
    fn desktop_chrome_on_windows() {
        let d = parse_user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36");
        assert_eq!((d.browser.as_str(), d.os.as_str(), d.device.as_str()), ("Chrome", "Windows", "Desktop"));
    }

    #[test]
    fn iphone_safari() {
        let d = parse_user_agent("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 Version/17.0 Mobile/15E148 Safari/604.1");
        assert_eq!((d.browser.as_str(), d.os.as_str(), d.device.as_str()), ("Safari", "iOS", "Mobile"));
    }

    #[test]
    fn edge_wins_over_chrome() {
        let d = parse_user_agent("Mozilla/5.0 (Windows NT 10.0) Chrome/120.0 Safari/537.36 Edg/120.0");
        assert_eq!(d.browser, "Edge");
    }

    #[test]
    fn empty_agent() {
        let d = parse_user_agent("");
        assert_eq!((d.browser.as_str(), d.os.as_str(), d.device.as_str()), ("Unknown", "Unknown", "Desktop"));
    }
}
