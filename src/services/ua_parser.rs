use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

const OTHER: &str = "Other";

#[derive(Clone, Debug, PartialEq)]
pub struct UAInfo {
    pub browser: Option<String>,
    pub browser_version: Option<String>,
    pub os: Option<String>,
    pub os_version: Option<String>,
    pub device_type: String,
}

impl UAInfo {
    /// `"<family> <version>"`, the family alone, or `"Other"`.
    pub fn browser_display(&self) -> String {
        display(self.browser.as_deref(), self.browser_version.as_deref())
    }

    pub fn os_display(&self) -> String {
        display(self.os.as_deref(), self.os_version.as_deref())
    }
}

fn display(family: Option<&str>, version: Option<&str>) -> String {
    match (family, version) {
        (Some(family), Some(version)) => format!("{} {}", family, version),
        (Some(family), None) => family.to_string(),
        (None, _) => OTHER.to_string(),
    }
}

struct Pattern {
    needle: &'static str,
    name: &'static str,
    version: Option<Regex>,
}

fn pattern(needle: &'static str, name: &'static str, version: Option<&str>) -> Pattern {
    Pattern {
        needle,
        name,
        version: version.map(|re| Regex::new(re).unwrap()),
    }
}

// Browsers - more specific patterns first
static BROWSER_PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| vec![
    pattern("edg/", "Edge", Some(r"edg/([\d.]+)")),
    pattern("opr/", "Opera", Some(r"opr/([\d.]+)")),
    pattern("opera", "Opera", Some(r"version/([\d.]+)")),
    pattern("firefox", "Firefox", Some(r"firefox/([\d.]+)")),
    pattern("crios", "Chrome Mobile iOS", Some(r"crios/([\d.]+)")),
    pattern("chrome", "Chrome", Some(r"chrome/([\d.]+)")),
    pattern("safari", "Safari", Some(r"version/([\d.]+)")),
    pattern("msie", "Internet Explorer", Some(r"msie ([\d.]+)")),
    pattern("trident", "Internet Explorer", Some(r"rv:([\d.]+)")),
]);

// OS - more specific patterns first
static OS_PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| vec![
    pattern("windows phone", "Windows Phone", Some(r"windows phone(?: os)? ([\d.]+)")),
    pattern("windows nt", "Windows", Some(r"windows nt ([\d.]+)")),
    pattern("iphone os", "iOS", Some(r"iphone os ([\d_]+)")),
    pattern("cpu os", "iOS", Some(r"cpu os ([\d_]+)")),
    pattern("mac os x", "macOS", Some(r"mac os x ([\d_.]+)")),
    pattern("android", "Android", Some(r"android ([\d.]+)")),
    pattern("cros ", "Chrome OS", None),
    pattern("linux", "Linux", None),
    pattern("freebsd", "FreeBSD", None),
]);

// Devices - priority order (tablet > mobile > fallback)
static DEVICE_PATTERNS: [(&str, &str); 8] = [
    ("ipad", "tablet"),
    ("kindle fire", "tablet"),
    ("tablet", "tablet"),
    ("windows phone", "mobile"),
    ("iphone", "mobile"),
    ("ipod", "mobile"),
    ("mobile", "mobile"),
    ("android", "mobile"),
];

// OS → Device fallback
static OS_DEVICE_FALLBACK: Lazy<HashMap<&str, &str>> = Lazy::new(|| {
    HashMap::from([
        ("iOS", "mobile"),
        ("Android", "mobile"),
        ("Windows Phone", "mobile"),
    ])
});

fn windows_release(nt_version: &str) -> String {
    match nt_version {
        "10.0" => "10",
        "6.3" => "8.1",
        "6.2" => "8",
        "6.1" => "7",
        "6.0" => "Vista",
        "5.2" => "XP x64",
        "5.1" => "XP",
        other => other,
    }
    .to_string()
}

fn match_pattern(patterns: &[Pattern], ua: &str) -> (Option<String>, Option<String>) {
    let Some(found) = patterns.iter().find(|p| ua.contains(p.needle)) else {
        return (None, None);
    };
    let version = found
        .version
        .as_ref()
        .and_then(|re| re.captures(ua))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace('_', ".").trim_end_matches('.').to_string())
        .filter(|v| !v.is_empty());
    (Some(found.name.to_string()), version)
}

/// Substring-based UA parser.
pub fn parse_user_agent(ua: &str) -> UAInfo {
    let ua = ua.to_lowercase();

    let (browser, browser_version) = match_pattern(&BROWSER_PATTERNS, &ua);
    let (os, mut os_version) = match_pattern(&OS_PATTERNS, &ua);
    if os.as_deref() == Some("Windows") {
        os_version = os_version.map(|v| windows_release(&v));
    }

    let device_type = DEVICE_PATTERNS
        .iter()
        .find(|(pattern, _)| ua.contains(pattern))
        .map(|(_, kind)| kind.to_string())
        .or_else(|| os.as_ref().and_then(|os| OS_DEVICE_FALLBACK.get(os.as_str()).map(|v| v.to_string())))
        .unwrap_or_else(|| "desktop".to_string());

    UAInfo {
        browser,
        browser_version,
        os,
        os_version,
        device_type,
    }
}
