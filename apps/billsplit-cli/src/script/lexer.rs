//! Line tokenizer for bill scripts.
//!
//! Words split on whitespace. Single or double quotes group a word and may
//! sit in the middle of one (`for="Mary Ann",Bob` is one token). A `#`
//! starting a word outside quotes ends the line.

/// Splits one script line into words.
///
/// ## Example
/// ```rust
/// use billsplit_cli::script::tokenize;
///
/// let words = tokenize(r#"item add "Red Wine" 12.50 category=Alcohol # dinner"#).unwrap();
/// assert_eq!(words, ["item", "add", "Red Wine", "12.50", "category=Alcohol"]);
/// ```
pub fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' => {
                in_word = true;
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == c {
                        closed = true;
                        break;
                    }
                    current.push(inner);
                }
                if !closed {
                    return Err(format!("unterminated {} quote", c));
                }
            }
            '#' if !in_word => break,
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        words.push(current);
    }
    Ok(words)
}
