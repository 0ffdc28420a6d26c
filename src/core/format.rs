//! Line formatting value types
//!
//! `FormatInfo` describes the color and font intent for a span of output.
//! Formats are layered: a later format overrides only the fields it
//! explicitly sets, everything else falls through to the earlier one.

use serde::{Deserialize, Serialize};
use std::ops::Add;

/// Closed set of named colors a handler can render.
///
/// `NoChange` is the sentinel meaning "keep whatever color is current".
/// Handlers that cannot display color ignore these entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogColor {
    #[default]
    NoChange,
    Black,
    Blue,
    Brown,
    Cyan,
    DarkBlue,
    DarkGray,
    DarkGreen,
    DarkCyan,
    DarkRed,
    DarkMagenta,
    Green,
    Gray,
    Magenta,
    Red,
    White,
    Yellow,
}

impl LogColor {
    /// Map onto the terminal color space. Dark variants land on the base
    /// ANSI colors, light variants on their bright counterparts.
    /// `NoChange` maps to `None`.
    pub fn terminal_color(self) -> Option<colored::Color> {
        use colored::Color;
        match self {
            LogColor::NoChange => None,
            LogColor::Black => Some(Color::Black),
            LogColor::Blue => Some(Color::BrightBlue),
            LogColor::Brown => Some(Color::Yellow),
            LogColor::Cyan => Some(Color::BrightCyan),
            LogColor::DarkBlue => Some(Color::Blue),
            LogColor::DarkGray => Some(Color::BrightBlack),
            LogColor::DarkGreen => Some(Color::Green),
            LogColor::DarkCyan => Some(Color::Cyan),
            LogColor::DarkRed => Some(Color::Red),
            LogColor::DarkMagenta => Some(Color::Magenta),
            LogColor::Green => Some(Color::BrightGreen),
            LogColor::Gray => Some(Color::White),
            LogColor::Magenta => Some(Color::BrightMagenta),
            LogColor::Red => Some(Color::BrightRed),
            LogColor::White => Some(Color::BrightWhite),
            LogColor::Yellow => Some(Color::BrightYellow),
        }
    }

    /// The bold rendition of a color: dark shades promote to their bright
    /// equivalents, everything already bright stays put.
    pub fn bold_promotion(self) -> LogColor {
        match self {
            LogColor::Brown => LogColor::Yellow,
            LogColor::DarkBlue => LogColor::Blue,
            LogColor::DarkGray => LogColor::Gray,
            LogColor::DarkGreen => LogColor::Green,
            LogColor::DarkCyan => LogColor::Cyan,
            LogColor::DarkRed => LogColor::Red,
            LogColor::DarkMagenta => LogColor::Magenta,
            LogColor::Gray => LogColor::White,
            other => other,
        }
    }
}

/// Tri-state font flag: `Unset` falls through when formats are layered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontStyle {
    #[default]
    Unset,
    Off,
    On,
}

impl FontStyle {
    pub fn is_on(self) -> bool {
        self == FontStyle::On
    }
}

/// Immutable color/style descriptor for a line of output, or applied as a
/// standing default via [`crate::Logger::set_fore_color`] and friends.
///
/// Compared and passed by value; there is no identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatInfo {
    pub fore_color: LogColor,
    pub back_color: LogColor,
    pub bold: FontStyle,
    pub italic: FontStyle,
    pub underline: FontStyle,
}

impl FormatInfo {
    /// Format that changes nothing.
    pub const UNFORMATTED: FormatInfo = FormatInfo {
        fore_color: LogColor::NoChange,
        back_color: LogColor::NoChange,
        bold: FontStyle::Unset,
        italic: FontStyle::Unset,
        underline: FontStyle::Unset,
    };

    pub const BOLD: FormatInfo = FormatInfo {
        bold: FontStyle::On,
        ..Self::UNFORMATTED
    };

    pub const ITALIC: FormatInfo = FormatInfo {
        italic: FontStyle::On,
        ..Self::UNFORMATTED
    };

    pub const UNDERLINE: FormatInfo = FormatInfo {
        underline: FontStyle::On,
        ..Self::UNFORMATTED
    };

    pub fn new() -> Self {
        Self::UNFORMATTED
    }

    #[must_use]
    pub fn with_fore_color(mut self, color: LogColor) -> Self {
        self.fore_color = color;
        self
    }

    #[must_use]
    pub fn with_back_color(mut self, color: LogColor) -> Self {
        self.back_color = color;
        self
    }

    #[must_use]
    pub fn with_bold(mut self, style: FontStyle) -> Self {
        self.bold = style;
        self
    }

    #[must_use]
    pub fn with_italic(mut self, style: FontStyle) -> Self {
        self.italic = style;
        self
    }

    #[must_use]
    pub fn with_underline(mut self, style: FontStyle) -> Self {
        self.underline = style;
        self
    }

    /// Layer `over` on top of this format. Every field `over` explicitly
    /// sets wins; unset fields fall through to `self`.
    #[must_use]
    pub fn layered(&self, over: &FormatInfo) -> FormatInfo {
        fn pick_color(base: LogColor, over: LogColor) -> LogColor {
            if over == LogColor::NoChange {
                base
            } else {
                over
            }
        }
        fn pick_style(base: FontStyle, over: FontStyle) -> FontStyle {
            if over == FontStyle::Unset {
                base
            } else {
                over
            }
        }

        FormatInfo {
            fore_color: pick_color(self.fore_color, over.fore_color),
            back_color: pick_color(self.back_color, over.back_color),
            bold: pick_style(self.bold, over.bold),
            italic: pick_style(self.italic, over.italic),
            underline: pick_style(self.underline, over.underline),
        }
    }
}

impl Add for FormatInfo {
    type Output = FormatInfo;

    fn add(self, rhs: FormatInfo) -> FormatInfo {
        self.layered(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unformatted() {
        assert_eq!(FormatInfo::default(), FormatInfo::UNFORMATTED);
        assert_eq!(LogColor::default(), LogColor::NoChange);
        assert_eq!(FontStyle::default(), FontStyle::Unset);
    }

    #[test]
    fn test_layered_overrides_only_set_fields() {
        let base = FormatInfo::new().with_back_color(LogColor::Blue);
        let red = FormatInfo::new().with_fore_color(LogColor::Red);

        let combined = base.layered(&red);
        assert_eq!(combined.fore_color, LogColor::Red);
        assert_eq!(combined.back_color, LogColor::Blue);

        // NoChange falls through, Red survives another layer
        let unchanged = combined.layered(&FormatInfo::new());
        assert_eq!(unchanged.fore_color, LogColor::Red);
        assert_eq!(unchanged.back_color, LogColor::Blue);
    }

    #[test]
    fn test_add_operator_matches_layered() {
        let base = FormatInfo::new()
            .with_fore_color(LogColor::Green)
            .with_bold(FontStyle::On);
        let over = FormatInfo::new()
            .with_fore_color(LogColor::White)
            .with_italic(FontStyle::On);

        let sum = base + over;
        assert_eq!(sum.fore_color, LogColor::White);
        assert_eq!(sum.bold, FontStyle::On);
        assert_eq!(sum.italic, FontStyle::On);
        assert_eq!(sum, base.layered(&over));
    }

    #[test]
    fn test_tri_state_off_overrides() {
        let bold = FormatInfo::BOLD;
        let plain = FormatInfo::new().with_bold(FontStyle::Off);

        assert_eq!(bold.layered(&plain).bold, FontStyle::Off);
        // Unset does not clear an earlier On
        assert_eq!(bold.layered(&FormatInfo::UNFORMATTED).bold, FontStyle::On);
    }

    #[test]
    fn test_bold_promotion() {
        assert_eq!(LogColor::DarkRed.bold_promotion(), LogColor::Red);
        assert_eq!(LogColor::Gray.bold_promotion(), LogColor::White);
        assert_eq!(LogColor::Red.bold_promotion(), LogColor::Red);
        assert_eq!(LogColor::NoChange.bold_promotion(), LogColor::NoChange);
    }

    #[test]
    fn test_terminal_color_mapping() {
        assert_eq!(LogColor::NoChange.terminal_color(), None);
        assert_eq!(
            LogColor::Brown.terminal_color(),
            Some(colored::Color::Yellow)
        );
        assert_eq!(
            LogColor::Red.terminal_color(),
            Some(colored::Color::BrightRed)
        );
    }

    #[test]
    fn test_serialization_round_trip() {
        let format = FormatInfo::new()
            .with_fore_color(LogColor::Cyan)
            .with_underline(FontStyle::On);

        let json = serde_json::to_string(&format).expect("serialize");
        let back: FormatInfo = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, format);
    }
}
