/// Parses `3600`, `3600s`, `90m` or `2h` into a positive number of seconds.
pub fn parse_duration(input: &str) -> Result<i64, String> {
    let input = input.trim();
    let (digits, unit) = match input.char_indices().last() {
        Some((index, unit)) if unit.is_ascii_alphabetic() => (&input[..index], unit),
        _ => (input, 's'),
    };

    let multiplier = match unit.to_ascii_lowercase() {
        's' => 1,
        'm' => 60,
        'h' => 3600,
        other => return Err(format!("unknown duration unit `{other}`, use s, m or h")),
    };

    let amount: i64 = digits
        .parse()
        .map_err(|_| format!("`{input}` is not a duration"))?;
    if amount < 1 {
        return Err("duration must be at least one unit".to_string());
    }

    amount
        .checked_mul(multiplier)
        .ok_or_else(|| format!("`{input}` is too long"))
}
