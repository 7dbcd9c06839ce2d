//! Canonical comparison form for Arabic names.
//!
//! Casual Arabic writing freely swaps several letter variants (hamza carriers,
//! alef maqsura, ta marbuta). Names and queries are both folded onto one
//! representative per group before any comparison.

use std::borrow::Cow;

/// Folds a single character onto its canonical representative.
///
/// No target character is itself a source, which makes folding idempotent.
pub(crate) const fn fold_char(c: char) -> char {
    match c {
        'أ' | 'إ' | 'آ' => 'ا',
        'ى' | 'ئ' => 'ي',
        'ة' => 'ه',
        'ؤ' => 'و',
        _ => c,
    }
}

/// Maps text to its canonical comparison form.
///
/// Total and pure: every input produces an output, characters outside the
/// substitution table pass through unchanged. Returns `Cow::Borrowed` when the
/// text is already canonical.
pub fn normalize(text: &str) -> Cow<'_, str> {
    if text.chars().all(|c| fold_char(c) == c) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().map(fold_char).collect())
    }
}
