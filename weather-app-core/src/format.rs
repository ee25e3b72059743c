//! Small value formatters shared by the current-weather and forecast mappings.

/// Round to one decimal place, halves away from zero (`2.25` becomes `2.3`).
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Capitalize the first letter of every word and lowercase the rest.
///
/// A word starts at any letter not preceded by another letter, so
/// `"light rain"` becomes `"Light Rain"` and `"SCATTERED clouds"` becomes
/// `"Scattered Clouds"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;

    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }

    out
}
