/// Strict dotted-quad IPv4 check.
///
/// Exactly four `.`-separated segments of one to three ASCII digits, each
/// at most 255. Leading zeros are accepted (`010.0.0.1`); nothing is
/// resolved, and surrounding whitespace is rejected.
pub fn is_valid_ipv4(input: &str) -> bool {
    let mut segments = 0;
    for segment in input.split('.') {
        segments += 1;
        if segments > 4 || !is_octet(segment) {
            return false;
        }
    }
    segments == 4
}

fn is_octet(segment: &str) -> bool {
    (1..=3).contains(&segment.len())
        && segment.bytes().all(|b| b.is_ascii_digit())
        && segment.parse::<u16>().is_ok_and(|v| v <= 255)
}
