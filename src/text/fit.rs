//! Width-based text fitting.
//!
//! Every decision is made with a measurement at the size the text will be
//! drawn with. When the shrink loop changes the size, later steps measure
//! again at the new size rather than reusing the earlier result.

use super::{ELLIPSIS, FontBackend};

/// At most this many lines come out of [`FitPolicy::Wrap`].
pub const MAX_WRAP_LINES: usize = 2;

/// How a string is fitted to its space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitPolicy {
    /// Draw at the starting size.
    Verbatim,
    /// Shrink towards the floor size until the text is no wider than `max_width`.
    Shrink { max_width: f32 },
    /// Shrink, then drop trailing characters behind an ellipsis until it fits.
    Truncate { max_width: f32 },
    /// Greedy word wrap at the starting size onto at most two lines.
    Wrap { max_width: f32 },
}

/// Result of fitting: the lines to draw and the size to draw them at.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedText {
    pub lines: Vec<String>,
    pub size: f32,
}

impl FittedText {
    fn single(text: String, size: f32) -> Self {
        let lines = if text.is_empty() { vec![] } else { vec![text] };
        Self { lines, size }
    }
}

/// Apply `policy` to `text`, starting at `start_size` and never shrinking below `floor`.
pub fn fit_text(
    font: &dyn FontBackend,
    text: &str,
    start_size: f32,
    floor: f32,
    policy: FitPolicy,
) -> FittedText {
    let text = text.trim();
    if text.is_empty() {
        return FittedText {
            lines: vec![],
            size: start_size,
        };
    }

    match policy {
        FitPolicy::Verbatim => FittedText::single(text.to_string(), start_size),
        FitPolicy::Shrink { max_width } => {
            let size = shrink_to_fit(font, text, start_size, floor, max_width);
            FittedText::single(text.to_string(), size)
        }
        FitPolicy::Truncate { max_width } => {
            let size = shrink_to_fit(font, text, start_size, floor, max_width);
            let out = truncate_to_width(font, text, size, max_width);
            FittedText::single(out, size)
        }
        FitPolicy::Wrap { max_width } => FittedText {
            lines: wrap_lines(font, text, start_size, max_width, MAX_WRAP_LINES),
            size: start_size,
        },
    }
}

/// Step the size down 1px at a time until `text` fits or `floor` is reached.
///
/// The result may still be too wide at the floor; callers accept the overflow.
pub fn shrink_to_fit(
    font: &dyn FontBackend,
    text: &str,
    start_size: f32,
    floor: f32,
    max_width: f32,
) -> f32 {
    let mut size = start_size;
    while size > floor {
        if font.measure(text, size) <= max_width {
            break;
        }
        size -= 1.0;
    }
    size
}

/// Drop trailing characters and append `…` until the text fits `max_width` at `size`.
///
/// Returns `…` alone if no prefix fits beside it, and an empty string if even
/// the ellipsis is wider than `max_width`.
pub fn truncate_to_width(font: &dyn FontBackend, text: &str, size: f32, max_width: f32) -> String {
    if font.measure(text, size) <= max_width {
        return text.to_string();
    }

    let mut chars: Vec<char> = text.chars().collect();
    while chars.pop().is_some() && !chars.is_empty() {
        let mut candidate: String = chars.iter().collect();
        candidate.push_str(ELLIPSIS);
        if font.measure(&candidate, size) <= max_width {
            return candidate;
        }
    }

    if font.measure(ELLIPSIS, size) <= max_width {
        ELLIPSIS.to_string()
    } else {
        String::new()
    }
}

/// Pack whitespace-separated words greedily onto at most `max_lines` lines.
///
/// A single word wider than `max_width` still gets a line of its own. Words
/// that don't fit on the last line are dropped.
pub fn wrap_lines(
    font: &dyn FontBackend,
    text: &str,
    size: f32,
    max_width: f32,
    max_lines: usize,
) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if current.is_empty() || font.measure(&candidate, size) <= max_width {
            current = candidate;
            continue;
        }

        lines.push(std::mem::take(&mut current));
        if lines.len() >= max_lines {
            break;
        }
        current = word.to_string();
    }

    if !current.is_empty() && lines.len() < max_lines {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::FixedAdvanceFont;
    use pretty_assertions::assert_eq;

    // 0.5 × px per character: 12px per char at 24px, 6px at the 12px floor.
    fn font() -> FixedAdvanceFont {
        FixedAdvanceFont::new(0.5)
    }

    #[test]
    fn test_verbatim_keeps_size() {
        let fitted = fit_text(&font(), "Jane Doe", 24.0, 12.0, FitPolicy::Verbatim);
        assert_eq!(fitted.lines, vec!["Jane Doe".to_string()]);
        assert_eq!(fitted.size, 24.0);
    }

    #[test]
    fn test_empty_text_has_no_lines() {
        for policy in [
            FitPolicy::Verbatim,
            FitPolicy::Shrink { max_width: 10.0 },
            FitPolicy::Truncate { max_width: 10.0 },
            FitPolicy::Wrap { max_width: 10.0 },
        ] {
            let fitted = fit_text(&font(), "   ", 24.0, 12.0, policy);
            assert!(fitted.lines.is_empty(), "{:?}", policy);
        }
    }

    #[test]
    fn test_shrink_stops_when_it_fits() {
        // 10 chars: width 5 × size. Fits 100px at size 20.
        let size = shrink_to_fit(&font(), "abcdefghij", 24.0, 12.0, 100.0);
        assert_eq!(size, 20.0);
    }

    #[test]
    fn test_shrink_stops_at_floor() {
        let size = shrink_to_fit(&font(), "abcdefghijklmnopqrstuvwxyz", 24.0, 12.0, 50.0);
        assert_eq!(size, 12.0);
    }

    #[test]
    fn test_shrink_leaves_fitting_text_alone() {
        let size = shrink_to_fit(&font(), "abc", 24.0, 12.0, 500.0);
        assert_eq!(size, 24.0);
    }

    #[test]
    fn test_truncate_appends_ellipsis() {
        // At 12px each char is 6px; 40px fits 6 chars, so 5 chars + ellipsis.
        let fitted = fit_text(
            &font(),
            "Remarks overflow",
            24.0,
            12.0,
            FitPolicy::Truncate { max_width: 40.0 },
        );
        assert_eq!(fitted.size, 12.0);
        assert_eq!(fitted.lines, vec!["Remar…".to_string()]);
    }

    #[test]
    fn test_truncate_never_exceeds_width() {
        let f = font();
        let text = "Senior Healthcare Assistant";
        for max_width in 0..200 {
            let max_width = max_width as f32;
            let out = truncate_to_width(&f, text, 12.0, max_width);
            assert!(
                f.measure(&out, 12.0) <= max_width,
                "{:?} wider than {}",
                out,
                max_width
            );
            let ellipsis_width = f.measure(ELLIPSIS, 12.0);
            assert_eq!(
                out.is_empty(),
                max_width < ellipsis_width,
                "width {}",
                max_width
            );
        }
    }

    #[test]
    fn test_truncate_lone_ellipsis() {
        // Room for the ellipsis only
        assert_eq!(truncate_to_width(&font(), "abcdef", 12.0, 8.0), "…");
    }

    #[test]
    fn test_wrap_two_lines() {
        // 12px per char at 24px; 120px holds 10 chars.
        let lines = wrap_lines(&font(), "Rose Court Care Home", 24.0, 120.0, 2);
        assert_eq!(lines, vec!["Rose Court".to_string(), "Care Home".to_string()]);
    }

    #[test]
    fn test_wrap_drops_third_line() {
        let lines = wrap_lines(&font(), "one two three four five six", 24.0, 96.0, 2);
        assert_eq!(lines, vec!["one two".to_string(), "three".to_string()]);
    }

    #[test]
    fn test_wrap_long_word_gets_own_line() {
        let lines = wrap_lines(&font(), "Supercalifragilistic home", 24.0, 60.0, 2);
        assert_eq!(
            lines,
            vec!["Supercalifragilistic".to_string(), "home".to_string()]
        );
    }
}
