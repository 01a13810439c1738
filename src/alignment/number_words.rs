const ONES: [&str; 20] = [
    "zero",
    "one",
    "two",
    "three",
    "four",
    "five",
    "six",
    "seven",
    "eight",
    "nine",
    "ten",
    "eleven",
    "twelve",
    "thirteen",
    "fourteen",
    "fifteen",
    "sixteen",
    "seventeen",
    "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [(u64, &str); 6] = [
    (1_000_000_000_000_000_000, "quintillion"),
    (1_000_000_000_000_000, "quadrillion"),
    (1_000_000_000_000, "trillion"),
    (1_000_000_000, "billion"),
    (1_000_000, "million"),
    (1_000, "thousand"),
];

/// Spells an ASCII digit string in English ("123" -> "one hundred
/// twenty-three"). Returns `None` unless `digits` is non-empty and all ASCII
/// digits. Values past `u64::MAX` are read out digit by digit.
pub fn spell_number(digits: &str) -> Option<String> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match digits.parse::<u64>() {
        Ok(value) => Some(spell_u64(value)),
        Err(_) => Some(
            digits
                .bytes()
                .map(|b| ONES[(b - b'0') as usize])
                .collect::<Vec<_>>()
                .join(" "),
        ),
    }
}

pub fn spell_u64(value: u64) -> String {
    if value == 0 {
        return ONES[0].to_string();
    }

    let mut parts = Vec::new();
    let mut rest = value;
    for (scale, name) in SCALES {
        if rest >= scale {
            parts.push(below_thousand(rest / scale));
            parts.push(name.to_string());
            rest %= scale;
        }
    }
    if rest > 0 {
        parts.push(below_thousand(rest));
    }
    parts.join(" ")
}

fn below_thousand(value: u64) -> String {
    debug_assert!(value > 0 && value < 1000);
    let hundreds = value / 100;
    let rem = (value % 100) as usize;

    let mut out = String::new();
    if hundreds > 0 {
        out.push_str(ONES[hundreds as usize]);
        out.push_str(" hundred");
    }
    if rem > 0 {
        if !out.is_empty() {
            out.push(' ');
        }
        if rem < 20 {
            out.push_str(ONES[rem]);
        } else {
            out.push_str(TENS[rem / 10]);
            if rem % 10 != 0 {
                out.push('-');
                out.push_str(ONES[rem % 10]);
            }
        }
    }
    out
}
