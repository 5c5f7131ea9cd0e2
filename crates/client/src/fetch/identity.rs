//! Browser identity profiles rotated across fetch attempts.
//!
//! `Accept-Encoding` is left to reqwest so response decompression stays on.

/// A named bundle of request headers mimicking one browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityProfile {
    pub name: &'static str,
    pub headers: &'static [(&'static str, &'static str)],
}

impl IdentityProfile {
    /// The `User-Agent` value of this profile, if any.
    pub fn user_agent(&self) -> Option<&'static str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("user-agent"))
            .map(|(_, v)| *v)
    }
}

pub const CHROME_WINDOWS: IdentityProfile = IdentityProfile {
    name: "chrome-windows",
    headers: &[
        (
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
        ),
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
        ),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("Referer", "https://codeforces.com/"),
        ("sec-ch-ua", "\"Chromium\";v=\"122\", \"Not(A:Brand\";v=\"24\", \"Google Chrome\";v=\"122\""),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", "\"Windows\""),
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "same-origin"),
        ("sec-fetch-user", "?1"),
        ("Cache-Control", "max-age=0"),
        ("DNT", "1"),
        ("Upgrade-Insecure-Requests", "1"),
    ],
};

pub const SAFARI_MACOS: IdentityProfile = IdentityProfile {
    name: "safari-macos",
    headers: &[
        (
            "User-Agent",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.3 Safari/605.1.15",
        ),
        ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("Referer", "https://codeforces.com/"),
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "same-origin"),
    ],
};

pub const FIREFOX_LINUX: IdentityProfile = IdentityProfile {
    name: "firefox-linux",
    headers: &[
        ("User-Agent", "Mozilla/5.0 (X11; Linux x86_64; rv:122.0) Gecko/20100101 Firefox/122.0"),
        ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"),
        ("Accept-Language", "en-US,en;q=0.5"),
        ("Referer", "https://codeforces.com/problemset"),
        ("DNT", "1"),
        ("Sec-Fetch-Dest", "document"),
        ("Sec-Fetch-Mode", "navigate"),
        ("Sec-Fetch-Site", "same-origin"),
        ("Upgrade-Insecure-Requests", "1"),
    ],
};

/// Fixed rotation order, tried for every candidate URL.
pub fn default_rotation() -> Vec<IdentityProfile> {
    vec![CHROME_WINDOWS, SAFARI_MACOS, FIREFOX_LINUX]
}
