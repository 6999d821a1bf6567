// ABOUTME: Fixed theme palettes used to auto-assign series colors when callers omit them.
// ABOUTME: Unknown theme names resolve to the default palette rather than failing.

/// Number of colors in every palette.
pub const PALETTE_SIZE: usize = 6;

/// An ordered set of colors associated with a named visual style.
pub type Palette = [&'static str; PALETTE_SIZE];

/// Name of the palette used when a theme is unknown.
pub const DEFAULT_THEME: &str = "default";

const DEFAULT: Palette = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#06b6d4",
];
const DARK: Palette = [
    "#1e40af", "#059669", "#d97706", "#dc2626", "#7c3aed", "#0891b2",
];
const CORPORATE: Palette = [
    "#1e3a8a", "#047857", "#92400e", "#991b1b", "#5b21b6", "#0e7490",
];
const FINANCIAL: Palette = [
    "#1e40af", "#059669", "#d97706", "#dc2626", "#7c3aed", "#0891b2",
];
const MODERN: Palette = [
    "#6366f1", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#06b6d4",
];
const COLORFUL: Palette = [
    "#ff6b6b", "#4ecdc4", "#45b7d1", "#96ceb4", "#feca57", "#ff9ff3",
];

/// Every known theme, in display order.
pub const THEMES: [(&str, &Palette); 6] = [
    ("default", &DEFAULT),
    ("dark", &DARK),
    ("corporate", &CORPORATE),
    ("financial", &FINANCIAL),
    ("modern", &MODERN),
    ("colorful", &COLORFUL),
];

/// Look up a theme by exact name.
pub fn lookup(theme: &str) -> Option<&'static Palette> {
    THEMES
        .iter()
        .find(|(name, _)| *name == theme)
        .map(|(_, palette)| *palette)
}

/// Resolve the palette for a theme, falling back to the default palette.
pub fn palette_for(theme: &str) -> &'static Palette {
    match lookup(theme) {
        Some(palette) => palette,
        None => {
            tracing::debug!(theme, "unknown chart theme, using default palette");
            &DEFAULT
        }
    }
}

/// The color at ordinal `index`, wrapping around the palette.
pub fn color_at(palette: &Palette, index: usize) -> &'static str {
    palette[index % PALETTE_SIZE]
}
