use egui::Color32;

pub trait ColorExt {
    fn parse_hex(hex: &str) -> Option<Self>
    where
        Self: Sized;
}

impl ColorExt for Color32 {
    fn parse_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Resolves a hex literal, falling back to `fallback` on malformed input.
pub fn hex_or(hex: &str, fallback: Color32) -> Color32 {
    Color32::parse_hex(hex).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_or_without_hash() {
        assert_eq!(Color32::parse_hex("#0f5132"), Some(Color32::from_rgb(15, 81, 50)));
        assert_eq!(Color32::parse_hex("FFFFFF"), Some(Color32::WHITE));
        assert_eq!(Color32::parse_hex("#fff"), None);
        assert_eq!(hex_or("zzzzzz", Color32::GRAY), Color32::GRAY);
    }
}
