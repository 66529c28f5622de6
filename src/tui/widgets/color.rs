use ratatui::style::Color;

/// Parse a color string into a ratatui Color
/// Supports:
/// - Named colors: black, red, green, yellow, blue, magenta, cyan, white, gray/grey
/// - Extended named colors: darkgray, lightred, lightgreen, lightyellow, lightblue, lightmagenta, lightcyan
/// - Hex format: #RRGGBB or #RGB (short form)
/// - RGB format: rgb(255,0,0) or rgb(255, 0, 0)
/// Returns Color::White for unrecognized colors
pub fn parse_color(color_str: &str) -> Color {
    let s = color_str.trim().to_lowercase();

    match s.as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "gray" | "grey" | "lightgray" | "lightgrey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightyellow" => Color::LightYellow,
        "lightblue" => Color::LightBlue,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        _ => {
            if s.starts_with('#') {
                parse_hex_color(&s).unwrap_or(Color::White)
            } else if s.starts_with("rgb(") {
                parse_rgb_color(&s).unwrap_or(Color::White)
            } else {
                Color::White
            }
        }
    }
}

/// Parse hex color format (#RRGGBB or #RGB)
fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }

    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
            // Expand: 0x0 -> 0x00, 0xF -> 0xFF
            Some(Color::Rgb((r << 4) | r, (g << 4) | g, (b << 4) | b))
        }
        _ => None,
    }
}

/// Parse RGB color format (rgb(r,g,b) or rgb(r, g, b))
fn parse_rgb_color(s: &str) -> Option<Color> {
    let content = s.strip_prefix("rgb(")?.strip_suffix(')')?;

    let parts: Vec<&str> = content.split(',').map(|s| s.trim()).collect();
    if parts.len() != 3 {
        return None;
    }

    let r = parts[0].parse::<u8>().ok()?;
    let g = parts[1].parse::<u8>().ok()?;
    let b = parts[2].parse::<u8>().ok()?;

    Some(Color::Rgb(r, g, b))
}

/// Relative luminance of an RGB color (WCAG formula), 0.0 dark to 1.0 light
fn calculate_luminance(r: u8, g: u8, b: u8) -> f64 {
    let linear = |c: u8| {
        let c = c as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };

    0.2126 * linear(r) + 0.7152 * linear(g) + 0.0722 * linear(b)
}

/// Get a readable foreground color for text on `background`.
/// Uses luminance for RGB colors and a simple heuristic for named colors.
pub fn get_contrast_text_color(background: Color) -> Color {
    let is_dark = match background {
        Color::Rgb(r, g, b) => calculate_luminance(r, g, b) < 0.5,
        // Gray is typically rendered light in most terminals
        other => matches!(other, Color::Black | Color::Blue | Color::Magenta | Color::Red),
    };

    if is_dark { Color::White } else { Color::Black }
}
