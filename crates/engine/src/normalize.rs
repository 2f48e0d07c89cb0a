// Symbol normalization — collapses each source's composite security labels
// onto the bare symbol so mappings from different providers become
// comparable.

use crate::table::Cell;

/// Composite labels that are currency conversion lines rather than
/// securities; their suffix is already the bare code.
const CURRENCY_PREFIXES: [&str; 2] = ["Dólar Cable", "Peso Argentino"];

/// Canonical symbol for a raw label cell.
///
/// Total over all cells: non-text cells (numeric codes, empties) pass
/// through unchanged, as does text without a hyphen.
pub fn normalize(label: &Cell) -> Cell {
    match label {
        Cell::Text(s) => Cell::Text(normalize_text(s)),
        other => other.clone(),
    }
}

/// Canonical symbol for a raw label string.
///
/// A hyphenated label splits into the text before the first hyphen
/// (`prefix`) and the text after the last hyphen (`suffix`), both trimmed.
/// Known issuance prefixes (ADR, CEDEAR classes, currency conversion
/// lines) are dropped outright; otherwise an `EXT` or `ADR` marker found
/// anywhere in the label is folded back onto the suffix so the same paper
/// keeps one key across exports.
pub fn normalize_text(label: &str) -> String {
    let (Some((head, _)), Some((_, tail))) = (label.split_once('-'), label.rsplit_once('-'))
    else {
        return label.to_string();
    };
    let prefix = head.trim();
    let suffix = tail.trim();

    if prefix == "ADR"
        || prefix.starts_with("CEDEAR")
        || CURRENCY_PREFIXES.contains(&prefix)
    {
        suffix.to_string()
    } else if label.contains("EXT") && !suffix.ends_with("EXT") {
        format!("{suffix} EXT")
    } else if label.contains("ADR") && !suffix.starts_with("ADR") {
        format!("{suffix} ADR")
    } else {
        suffix.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adr_prefix_is_dropped() {
        assert_eq!(normalize_text("ADR-XYZ"), "XYZ");
        assert_eq!(normalize_text("ADR - XYZ"), "XYZ");
    }

    #[test]
    fn cedear_class_prefix_is_dropped() {
        assert_eq!(normalize_text("CEDEAR Class-ABC"), "ABC");
        assert_eq!(normalize_text("CEDEAR-ABC"), "ABC");
    }

    #[test]
    fn currency_conversion_prefixes_are_dropped() {
        assert_eq!(normalize_text("Dólar Cable-AAPL"), "AAPL");
        assert_eq!(normalize_text("Peso Argentino-GGAL"), "GGAL");
    }

    #[test]
    fn ext_marker_folds_onto_suffix() {
        assert_eq!(normalize_text("FOO EXT-BAR"), "BAR EXT");
        // Suffix already carries the marker: left alone
        assert_eq!(normalize_text("FOO-BAR EXT"), "BAR EXT");
    }

    #[test]
    fn adr_marker_folds_onto_suffix() {
        assert_eq!(normalize_text("FOO ADR-BAR"), "BAR ADR");
        assert_eq!(normalize_text("FOO-ADR BAR"), "ADR BAR");
    }

    #[test]
    fn plain_hyphen_takes_suffix() {
        assert_eq!(normalize_text("FOO-BAR"), "BAR");
        assert_eq!(normalize_text("A-B-C"), "C");
    }

    #[test]
    fn no_hyphen_passes_through() {
        assert_eq!(normalize_text("NOHYPHEN"), "NOHYPHEN");
    }

    #[test]
    fn non_text_cells_pass_through() {
        assert_eq!(normalize(&Cell::Number(42.0)), Cell::Number(42.0));
        assert_eq!(normalize(&Cell::Empty), Cell::Empty);
    }
}
