/// Formats a composition label for Latex.
///
/// Every run of digits (decimal points included) becomes a subscript, so `Na2O`
/// becomes `Na$_{2}$O`. With `all_math` the whole label is one math block with
/// upright element symbols: `$\mathrm{Na}_{2}\mathrm{O}$`. Characters that are
/// neither letters nor digits are kept as they are.
pub fn format_composition(label: &str, all_math: bool) -> String {
    let mut out = String::with_capacity(label.len() * 2);
    let mut chars = label.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            let mut digits = String::from(c);
            while let Some(&next) = chars.peek() {
                if next.is_ascii_digit() || next == '.' {
                    digits.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            if all_math {
                out.push_str(&format!("_{{{}}}", digits));
            } else {
                out.push_str(&format!("$_{{{}}}$", digits));
            }
        } else if all_math && c.is_alphabetic() {
            let mut word = String::from(c);
            while let Some(&next) = chars.peek() {
                if next.is_alphabetic() {
                    word.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            out.push_str(&format!("\\mathrm{{{}}}", word));
        } else {
            out.push(c);
        }
    }

    if all_math {
        format!("${}$", out)
    } else {
        out
    }
}
