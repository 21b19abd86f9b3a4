use std::path::PathBuf;

/// A primitive that can be stored as the text payload of a tree node.
///
/// Decoding returns `None` for text that does not represent a `Self`; the
/// engine then falls back to the declared default.
pub trait SettingValue: Clone + PartialEq + Send + Sync + 'static {
    fn encode(&self) -> String;

    fn decode(raw: &str) -> Option<Self>;

    /// Diagnostic name recorded in value descriptors
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

macro_rules! impl_setting_value_via_from_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SettingValue for $ty {
                fn encode(&self) -> String {
                    self.to_string()
                }

                fn decode(raw: &str) -> Option<Self> {
                    raw.trim().parse().ok()
                }
            }
        )*
    };
}

impl_setting_value_via_from_str!(
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64,
);

impl SettingValue for bool {
    fn encode(&self) -> String {
        self.to_string()
    }

    fn decode(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
}

impl SettingValue for char {
    fn encode(&self) -> String {
        self.to_string()
    }

    fn decode(raw: &str) -> Option<Self> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

impl SettingValue for String {
    fn encode(&self) -> String {
        self.clone()
    }

    fn decode(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl SettingValue for PathBuf {
    fn encode(&self) -> String {
        self.to_string_lossy().into_owned()
    }

    fn decode(raw: &str) -> Option<Self> {
        Some(PathBuf::from(raw))
    }
}
