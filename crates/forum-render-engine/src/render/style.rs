use serde::Serialize;

pub const DEFAULT_FONT_SIZE: f32 = 17.0;

/// Resolved font of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Font {
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub monospaced: bool,
}

impl Default for Font {
    fn default() -> Self {
        Self::of_size(DEFAULT_FONT_SIZE)
    }
}

impl Font {
    pub fn of_size(size: f32) -> Self {
        Self {
            size,
            bold: false,
            italic: false,
            monospaced: false,
        }
    }

    pub fn bold(self) -> Self {
        Self { bold: true, ..self }
    }

    pub fn italic(self) -> Self {
        Self {
            italic: true,
            ..self
        }
    }

    pub fn monospaced(self) -> Self {
        Self {
            monospaced: true,
            ..self
        }
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self {
            size: self.size * factor,
            ..self
        }
    }
}

/// Text colour. Semantic variants are left to the host's theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    #[default]
    Primary,
    /// Dimmed text, e.g. unknown stickers.
    Secondary,
    Accent,
    /// Body text inside a quote.
    Quoted,
    Rgb(u32),
}

/// Styles that stack rather than replace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TextStyles {
    pub underline: bool,
    pub strikethrough: bool,
}

impl TextStyles {
    pub const UNDERLINE: Self = Self {
        underline: true,
        strikethrough: false,
    };
    pub const STRIKETHROUGH: Self = Self {
        underline: false,
        strikethrough: true,
    };

    pub fn union(self, other: Self) -> Self {
        Self {
            underline: self.underline || other.underline,
            strikethrough: self.strikethrough || other.strikethrough,
        }
    }

    pub fn contains(self, other: Self) -> bool {
        self.union(other) == self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Leading,
    Center,
    Trailing,
}

impl Alignment {
    /// Parses an `[align=...]` attribute.
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Alignment::Leading),
            "center" => Some(Alignment::Center),
            "right" => Some(Alignment::Trailing),
            _ => None,
        }
    }
}

/// Named colours accepted by `[color=...]`.
const PALETTE: &[(&str, u32)] = &[
    ("skyblue", 0x87CEEB),
    ("royalblue", 0x4169E1),
    ("blue", 0x0066BB),
    ("darkblue", 0x00008B),
    ("orange", 0xA06700),
    ("orangered", 0xFF4500),
    ("crimson", 0xDC143C),
    ("red", 0xDD0000),
    ("firebrick", 0xB22222),
    ("darkred", 0x8B0000),
    ("green", 0x3D9F0E),
    ("limegreen", 0x32CD32),
    ("seagreen", 0x2E8B57),
    ("teal", 0x008080),
    ("deeppink", 0xFF1493),
    ("tomato", 0xFF6347),
    ("coral", 0xFF7F50),
    ("purple", 0x800080),
    ("indigo", 0x4B0082),
    ("burlywood", 0xDEB887),
    ("sandybrown", 0xF4A460),
    ("chocolate", 0xD2691E),
    ("sienna", 0xA0522D),
    ("silver", 0x888888),
    ("white", 0xFFFFFF),
];

pub fn palette_color(name: &str) -> Option<Color> {
    PALETTE
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, rgb)| Color::Rgb(*rgb))
}
