pub mod ask;
pub mod health;
pub mod history;
pub mod info;
pub mod upload;

/// Seconds rendered with two decimals and an `s` suffix, e.g. `1.50s`.
pub fn format_duration(secs: f64) -> String {
    format!("{secs:.2}s")
}

#[cfg(test)]
mod tests {
    use super::format_duration;

    #[test]
    fn durations_have_two_decimals() {
        assert_eq!(format_duration(2.0), "2.00s");
        assert_eq!(format_duration(0.1), "0.10s");
        assert_eq!(format_duration(1.456), "1.46s");
    }
}
