//! Region display labels.
//!
//! COROP names are too wide to draw on one line at province zoom, so they
//! are broken into lines by an ordered list of literal replacements. The
//! rule set is data: to adjust a label, add an entry.

/// Name-specific line breaks, applied before the general rules. These must
/// run first: once a general rule has split a name, a longer literal would
/// no longer match.
const OVERRIDE_RULES: &[(&str, &str)] = &[
    ("Agglomeratie 's-Gravenhage", "Agglomeratie\n's-Gravenhage"),
    ("Alkmaar en omgeving", "Alkmaar\nen omgeving"),
    ("Delfzijl en omgeving", "Delfzijl\nen omgeving"),
    ("Zeeuwsch-Vlaanderen", "Zeeuwsch-\nVlaanderen"),
    ("Zuidoost-Noord-Brabant", "Zuidoost-\nNoord-Brabant"),
    ("Noordoost-Noord-Brabant", "Noordoost-\nNoord-Brabant"),
    ("Midden-Noord-Brabant", "Midden-\nNoord-Brabant"),
    ("West-Noord-Brabant", "West-\nNoord-Brabant"),
];

/// General line-break rules, applied after the overrides. Each inserts a
/// newline at a natural phrase boundary. The replacement text is never
/// matched by a later rule, so the whole pass is idempotent.
const GENERAL_RULES: &[(&str, &str)] = &[
    (" en ", " en\n"),
    (", ", ",\n"),
    ("van ", "van\n"),
];

/// Rewrite a region name into its multi-line display label.
/// Pure and idempotent: applying it to its own output changes nothing.
pub fn display_label(name: &str) -> String {
    let mut label = name.to_string();
    for (from, to) in OVERRIDE_RULES.iter().chain(GENERAL_RULES.iter()) {
        label = label.replace(from, to);
    }
    label
}
