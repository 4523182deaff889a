// src/matching/address.rs
use once_cell::sync::Lazy;
use regex::Regex;

/// A street address that starts with a PO-box token: "PO Box 9", "P.O. Box 9",
/// "P O Box", "Box 12". "Boxwood Ln" and "12 Box Elder St" are street addresses.
static PO_BOX_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(p\s*\.?\s*o\s*\.?\s*)?box\b").expect("PO box pattern is valid")
});

pub fn is_po_box(address: &str) -> bool {
    PO_BOX_PATTERN.is_match(address)
}

pub fn is_blank(address: &str) -> bool {
    address.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_po_box_variants() {
        for address in [
            "PO Box 9",
            "po box 9",
            "P.O. Box 45",
            "P. O. Box 45",
            "P O Box 1",
            "P.O.Box 3",
            "POBox 3",
            "Box 12",
            "  BOX 7",
        ] {
            assert!(is_po_box(address), "{address} should be a PO box");
        }
    }

    #[test]
    fn test_street_addresses_are_not_po_boxes() {
        for address in [
            "123 Main St",
            "Boxwood Lane",
            "12 Box Elder St",
            "Post Office Square",
            "",
        ] {
            assert!(!is_po_box(address), "{address} should not be a PO box");
        }
    }

    #[test]
    fn test_blank_address() {
        assert!(is_blank("   "));
        assert!(!is_blank("1 Elm"));
    }
}
