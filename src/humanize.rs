// src/humanize.rs
//! Natural-language durations for log lines ("1 hour, 2 minutes and 5 seconds").

const UNITS: [(u64, &str); 4] = [
    (86_400, "day"),
    (3_600, "hour"),
    (60, "minute"),
    (1, "second"),
];

pub fn natural_duration(secs: u64) -> String {
    let mut rest = secs;
    let mut parts = Vec::new();
    for (size, name) in UNITS {
        let n = rest / size;
        rest %= size;
        if n > 0 {
            let plural = if n == 1 { "" } else { "s" };
            parts.push(format!("{n} {name}{plural}"));
        }
    }

    match parts.len() {
        0 => "0 seconds".to_string(),
        1 => parts.remove(0),
        _ => {
            let last = parts.pop().unwrap_or_default();
            format!("{} and {last}", parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_common_intervals() {
        assert_eq!(natural_duration(0), "0 seconds");
        assert_eq!(natural_duration(1), "1 second");
        assert_eq!(natural_duration(90), "1 minute and 30 seconds");
        assert_eq!(natural_duration(3_600), "1 hour");
        assert_eq!(natural_duration(3_725), "1 hour, 2 minutes and 5 seconds");
        assert_eq!(natural_duration(90_000), "1 day and 1 hour");
    }
}
