/// Meeting-day codes in the order the source prints them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayCode {
    M,
    Tu,
    W,
    Th,
    F,
    Sa,
}

impl DayCode {
    pub const ALL: [DayCode; 6] = [
        DayCode::M,
        DayCode::Tu,
        DayCode::W,
        DayCode::Th,
        DayCode::F,
        DayCode::Sa,
    ];

    fn token(self) -> &'static str {
        match self {
            DayCode::M => "m",
            DayCode::Tu => "tu",
            DayCode::W => "w",
            DayCode::Th => "th",
            DayCode::F => "f",
            DayCode::Sa => "sa",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayCode::M => "M",
            DayCode::Tu => "Tu",
            DayCode::W => "W",
            DayCode::Th => "Th",
            DayCode::F => "F",
            DayCode::Sa => "Sa",
        }
    }
}

/// Extract day codes by substring containment against the lower-cased raw
/// string, checked in `ALL` order. The source reduces day names to 1-2
/// letter tokens upstream, so containment is a heuristic that holds for the
/// observed data rather than a tokenizer.
pub fn extract(raw: &str) -> Vec<DayCode> {
    let lower = raw.to_lowercase();
    DayCode::ALL
        .iter()
        .copied()
        .filter(|day| lower.contains(day.token()))
        .collect()
}
