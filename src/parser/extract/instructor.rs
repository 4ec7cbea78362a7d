/// Instructor name parts. Email never appears in the source tables and
/// stays empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Instructor {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// The roster column prints `"<last name(s)> <first initial>"`, so the
/// final whitespace token is the first-name initial and everything before
/// it is the last name.
pub fn extract(raw: &str) -> Instructor {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    let Some((first, rest)) = tokens.split_last() else {
        return Instructor::default();
    };
    Instructor {
        first_name: first.to_string(),
        last_name: rest.join(" "),
        email: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_name_then_initial() {
        let i = extract("Smith J");
        assert_eq!(i.first_name, "J");
        assert_eq!(i.last_name, "Smith");
        assert_eq!(i.email, "");
    }

    #[test]
    fn multi_word_last_name() {
        let i = extract("Van Der Berg J");
        assert_eq!(i.first_name, "J");
        assert_eq!(i.last_name, "Van Der Berg");
    }

    #[test]
    fn empty_string() {
        assert_eq!(extract(""), Instructor::default());
        assert_eq!(extract("   "), Instructor::default());
    }

    #[test]
    fn single_token_has_no_last_name() {
        let i = extract("Staff");
        assert_eq!(i.first_name, "Staff");
        assert_eq!(i.last_name, "");
    }
}
