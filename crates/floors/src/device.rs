use {regex::Regex, serde::Serialize, std::sync::LazyLock};

static TABLET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)ipad|tablet|kindle|playbook|silk|puffin").expect("valid regex")
});

static MOBILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)mobile|iphone|ipod|blackberry|iemobile|opera m(ob|in)i|windows phone|webos")
        .expect("valid regex")
});

/// Device class reported to the floor service, derived from the browser's
/// user-agent string.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
}

impl DeviceType {
    pub fn from_user_agent(user_agent: &str) -> Self {
        // Android tablets carry "Android" without "Mobile"; Android phones
        // carry both.
        let android = user_agent.to_lowercase().contains("android");
        let mobile = MOBILE.is_match(user_agent);
        if TABLET.is_match(user_agent) || (android && !mobile) {
            Self::Tablet
        } else if mobile {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_phones_as_mobile() {
        let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
                      AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 \
                      Safari/604.1";
        let android_phone = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 \
                             (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";
        assert_eq!(DeviceType::from_user_agent(iphone), DeviceType::Mobile);
        assert_eq!(DeviceType::from_user_agent(android_phone), DeviceType::Mobile);
    }

    #[test]
    fn classifies_tablets_as_tablet() {
        let ipad = "Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X) AppleWebKit/605.1.15 \
                    (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1";
        // Android tablets do not advertise "Mobile".
        let android_tablet = "Mozilla/5.0 (Linux; Android 13; SM-X200) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
        assert_eq!(DeviceType::from_user_agent(ipad), DeviceType::Tablet);
        assert_eq!(DeviceType::from_user_agent(android_tablet), DeviceType::Tablet);
    }

    #[test]
    fn everything_else_is_desktop() {
        let chrome = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                      (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
        assert_eq!(DeviceType::from_user_agent(chrome), DeviceType::Desktop);
        assert_eq!(DeviceType::from_user_agent(""), DeviceType::Desktop);
    }

    #[test]
    fn serializes_with_capitalized_labels() {
        assert_eq!(
            serde_json::to_value(DeviceType::Desktop).unwrap(),
            "Desktop"
        );
        assert_eq!(serde_json::to_value(DeviceType::Mobile).unwrap(), "Mobile");
        assert_eq!(serde_json::to_value(DeviceType::Tablet).unwrap(), "Tablet");
    }
}
