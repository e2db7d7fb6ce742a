// Store path segment sanitizing
//
// Mesh node names and SSIDs come from the router verbatim. Before they can
// be used as a path segment, every run of characters outside the allowed
// set collapses into a single `_`. The `.` separator and the `*` wildcard
// are never allowed.

const ALLOWED_PUNCTUATION: &str = "_-:!#$%&()+=@^{}|~";

fn is_allowed(c: char) -> bool {
    c.is_alphanumeric() || ALLOWED_PUNCTUATION.contains(c)
}

/// Turn an external name into a single store path segment.
pub fn sanitize_segment(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if is_allowed(c) {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::sanitize_segment;

    #[test]
    fn keeps_plain_names() {
        assert_eq!(sanitize_segment("Home-5G"), "Home-5G");
        assert_eq!(sanitize_segment("Büro_WLAN"), "Büro_WLAN");
    }

    #[test]
    fn replaces_separator_and_wildcard() {
        assert_eq!(sanitize_segment("guest.net"), "guest_net");
        assert_eq!(sanitize_segment("a*b"), "a_b");
    }

    #[test]
    fn collapses_runs() {
        assert_eq!(sanitize_segment("My Home  WiFi"), "My_Home_WiFi");
        assert_eq!(sanitize_segment("x. *y"), "x_y");
        assert_eq!(sanitize_segment("..."), "_");
    }
}
