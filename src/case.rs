use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

// ─── Case ───────────────────────────────────────────────────────────────────

/// Naming convention of a field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Case {
    /// `firstName`
    LowerCamel,
    /// `FirstName`
    #[default]
    UpperCamel,
    /// `first_name`
    LowerSnake,
    /// `FIRST_NAME`
    UpperSnake,
    /// `firstname`
    Lower,
    /// `FIRSTNAME`
    Upper,
}

impl Case {
    /// Convert `name`, written in `self`, into `target`.
    /// Converting into the same case returns the name untouched.
    pub fn format(self, name: &str, target: Case) -> SmolStr {
        if self == target {
            return SmolStr::from(name);
        }
        let words = self.split(name);
        let mut out = String::with_capacity(name.len() + words.len());
        for (i, word) in words.iter().enumerate() {
            match target {
                Case::LowerCamel if i == 0 => out.push_str(&word.to_lowercase()),
                Case::LowerCamel | Case::UpperCamel => push_capitalized(&mut out, word),
                Case::LowerSnake | Case::UpperSnake => {
                    if i > 0 {
                        out.push('_');
                    }
                    if target == Case::LowerSnake {
                        out.push_str(&word.to_lowercase());
                    } else {
                        out.push_str(&word.to_uppercase());
                    }
                }
                Case::Lower => out.push_str(&word.to_lowercase()),
                Case::Upper => out.push_str(&word.to_uppercase()),
            }
        }
        log::trace!("case {:?} -> {:?}: {} -> {}", self, target, name, out);
        SmolStr::from(out)
    }

    fn split(self, name: &str) -> Vec<&str> {
        match self {
            Case::LowerSnake | Case::UpperSnake => {
                name.split('_').filter(|w| !w.is_empty()).collect()
            }
            Case::LowerCamel | Case::UpperCamel => split_camel(name),
            Case::Lower | Case::Upper => vec![name],
        }
    }
}

fn push_capitalized(out: &mut String, word: &str) {
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(&chars.as_str().to_lowercase());
    }
}

/// Split on lower→upper transitions and at the end of an acronym run
/// (`HTTPServer` → `HTTP`, `Server`). Digits stick to the preceding word.
fn split_camel(name: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = name.char_indices().collect();
    let mut words = Vec::new();
    let mut start = 0;
    for i in 1..chars.len() {
        let (pos, c) = chars[i];
        let prev = chars[i - 1].1;
        if !c.is_uppercase() {
            continue;
        }
        let boundary = prev.is_lowercase()
            || prev.is_ascii_digit()
            || (prev.is_uppercase() && chars.get(i + 1).is_some_and(|(_, n)| n.is_lowercase()));
        if boundary {
            words.push(&name[start..pos]);
            start = pos;
        }
    }
    if start < name.len() {
        words.push(&name[start..]);
    }
    words
}
