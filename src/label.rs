//! Display formatting for camel-cased field names.

/// Turns a camel-cased identifier into a display label by inserting a space before every
/// interior ASCII uppercase letter. Other capitals are left where they are.
///
/// Labels that already contain whitespace are considered human-readable and are returned
/// unchanged, so `"EEG File Name"` stays intact while `"totalSleepDuration"` becomes
/// `"total Sleep Duration"`.
pub fn humanize_label(name: &str) -> String {
    if name.chars().any(char::is_whitespace) {
        return name.to_owned();
    }

    let mut label = String::with_capacity(name.len() + 4);
    for (index, ch) in name.chars().enumerate() {
        if index > 0 && ch.is_ascii_uppercase() {
            label.push(' ');
        }
        label.push(ch);
    }
    label
}

/// Reverses [`humanize_label`] by dropping each space that directly precedes an ASCII uppercase
/// letter.
pub fn collapse_label(label: &str) -> String {
    let mut collapsed = String::with_capacity(label.len());
    let mut chars = label.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == ' ' && chars.peek().is_some_and(char::is_ascii_uppercase) {
            continue;
        }
        collapsed.push(ch);
    }
    collapsed
}
