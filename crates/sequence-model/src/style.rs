//! Subtitle style overrides.
//!
//! Every stylable field on a segment is either an explicit value or
//! [`Override::Inherited`]. On the wire `null` (or a missing key) means
//! inherited; anything else is explicit. This keeps "use the task value"
//! apart from explicit values that happen to look empty, such as `false`
//! for "no background box".

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A per-field override that either carries a value or defers to the next
/// precedence level.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Override<T> {
    /// Use this value regardless of task or built-in defaults.
    Explicit(T),
    /// Fall through to the task-level value, then the built-in default.
    #[default]
    Inherited,
}

impl<T> Override<T> {
    pub fn is_inherited(&self) -> bool {
        matches!(self, Self::Inherited)
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::Explicit(_))
    }

    /// The explicit value, if any.
    pub fn explicit(&self) -> Option<&T> {
        match self {
            Self::Explicit(v) => Some(v),
            Self::Inherited => None,
        }
    }

    pub fn as_ref(&self) -> Override<&T> {
        match self {
            Self::Explicit(v) => Override::Explicit(v),
            Self::Inherited => Override::Inherited,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Override<U> {
        match self {
            Self::Explicit(v) => Override::Explicit(f(v)),
            Self::Inherited => Override::Inherited,
        }
    }

    /// Keep `self` when explicit, otherwise take `next`.
    pub fn or(self, next: Override<T>) -> Override<T> {
        match self {
            Self::Explicit(_) => self,
            Self::Inherited => next,
        }
    }

    /// Resolve against a final fallback.
    pub fn unwrap_or(self, fallback: T) -> T {
        match self {
            Self::Explicit(v) => v,
            Self::Inherited => fallback,
        }
    }
}

impl<T> From<Option<T>> for Override<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Inherited, Self::Explicit)
    }
}

impl<T: Serialize> Serialize for Override<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Explicit(v) => v.serialize(serializer),
            Self::Inherited => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Override<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

/// Vertical subtitle placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubtitlePosition {
    #[default]
    Bottom,
    Top,
    Center,
    /// Placed at `custom_position` percent from the top.
    Custom,
}

/// Subtitle background box.
///
/// Wire form is `false`, `true`, or a color string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "BackgroundRepr", into = "BackgroundRepr")]
pub enum BackgroundMode {
    /// No background box. An explicit choice, never inheritance.
    Off,
    /// Renderer's default box color.
    Box,
    /// Box in the given color (e.g. `#000000`).
    Color(String),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum BackgroundRepr {
    Flag(bool),
    Color(String),
}

impl From<BackgroundRepr> for BackgroundMode {
    fn from(repr: BackgroundRepr) -> Self {
        match repr {
            BackgroundRepr::Flag(false) => Self::Off,
            BackgroundRepr::Flag(true) => Self::Box,
            BackgroundRepr::Color(c) if c.trim().is_empty() => Self::Box,
            BackgroundRepr::Color(c) => Self::Color(c),
        }
    }
}

impl From<BackgroundMode> for BackgroundRepr {
    fn from(mode: BackgroundMode) -> Self {
        match mode {
            BackgroundMode::Off => Self::Flag(false),
            BackgroundMode::Box => Self::Flag(true),
            BackgroundMode::Color(c) => Self::Color(c),
        }
    }
}

/// Per-segment subtitle style overrides.
///
/// Field names match the backend's segment schema so the struct can be
/// flattened into [`crate::Segment`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOverrides {
    /// `Explicit(false)` disables subtitles for this segment only.
    pub subtitle_enabled: Override<bool>,
    pub subtitle_position: Override<SubtitlePosition>,
    /// Percent from the top, used when the position is `custom`.
    pub custom_position: Override<f64>,
    /// Subtitle time shift in seconds (may be negative).
    pub subtitle_offset: Override<f64>,
    pub font_name: Override<String>,
    pub font_size: Override<u32>,
    pub text_fore_color: Override<String>,
    pub stroke_color: Override<String>,
    pub stroke_width: Override<f64>,
    pub text_background_color: Override<BackgroundMode>,
}

impl StyleOverrides {
    /// True when no field carries an explicit value.
    pub fn is_fully_inherited(&self) -> bool {
        self.subtitle_enabled.is_inherited()
            && self.subtitle_position.is_inherited()
            && self.custom_position.is_inherited()
            && self.subtitle_offset.is_inherited()
            && self.font_name.is_inherited()
            && self.font_size.is_inherited()
            && self.text_fore_color.is_inherited()
            && self.stroke_color.is_inherited()
            && self.stroke_width.is_inherited()
            && self.text_background_color.is_inherited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_and_missing_deserialize_as_inherited() {
        let style: StyleOverrides =
            serde_json::from_str(r##"{ "font_size": null, "text_fore_color": "#FF0000" }"##)
                .unwrap();
        assert!(style.font_size.is_inherited());
        assert!(style.subtitle_offset.is_inherited());
        assert_eq!(
            style.text_fore_color,
            Override::Explicit("#FF0000".to_string())
        );
    }

    #[test]
    fn test_explicit_false_background_is_not_inherited() {
        let style: StyleOverrides =
            serde_json::from_str(r#"{ "text_background_color": false }"#).unwrap();
        assert_eq!(
            style.text_background_color,
            Override::Explicit(BackgroundMode::Off)
        );

        let style: StyleOverrides =
            serde_json::from_str(r##"{ "text_background_color": "#112233" }"##).unwrap();
        assert_eq!(
            style.text_background_color,
            Override::Explicit(BackgroundMode::Color("#112233".to_string()))
        );
    }

    #[test]
    fn test_explicit_false_subtitle_enabled_survives_serialization() {
        let style = StyleOverrides {
            subtitle_enabled: Override::Explicit(false),
            ..StyleOverrides::default()
        };
        let json = serde_json::to_value(&style).unwrap();
        assert_eq!(json["subtitle_enabled"], serde_json::Value::Bool(false));
        assert!(json["font_size"].is_null());

        let back: StyleOverrides = serde_json::from_value(json).unwrap();
        assert_eq!(back.subtitle_enabled, Override::Explicit(false));
    }

    #[test]
    fn test_override_or_prefers_explicit() {
        let seg: Override<u32> = Override::Inherited;
        let task = Override::Explicit(48);
        assert_eq!(seg.or(task).unwrap_or(60), 48);

        let seg = Override::Explicit(72);
        assert_eq!(seg.or(Override::Explicit(48)).unwrap_or(60), 72);
    }

    #[test]
    fn test_position_wire_names() {
        let pos: SubtitlePosition = serde_json::from_str("\"custom\"").unwrap();
        assert_eq!(pos, SubtitlePosition::Custom);
        assert_eq!(
            serde_json::to_string(&SubtitlePosition::Center).unwrap(),
            "\"center\""
        );
    }

    #[test]
    fn test_fully_inherited_default() {
        assert!(StyleOverrides::default().is_fully_inherited());
        let style = StyleOverrides {
            stroke_width: Override::Explicit(2.0),
            ..StyleOverrides::default()
        };
        assert!(!style.is_fully_inherited());
    }
}
