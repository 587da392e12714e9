//! Filename sanitization for names that come from the server.

/// Longest filename kept, in bytes (Linux NAME_MAX).
const NAME_MAX: usize = 255;

/// Sanitizes a server-supplied filename so it stays inside the download directory.
///
/// - Drops any directory part (`../../etc/passwd` -> `passwd`, `C:\x\y.txt` -> `y.txt`)
/// - Replaces NUL, control characters and `<>:"|?*` with `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing spaces, dots and underscores
/// - Limits length to 255 bytes, keeping the extension when possible
pub fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(name);

    let mut out = String::with_capacity(base.len());
    let mut prev_underscore = false;
    for c in base.chars() {
        let c = if c.is_control() || matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*') {
            '_'
        } else {
            c
        };
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == ' ' || c == '.' || c == '_');
    truncate_keeping_extension(trimmed, NAME_MAX)
}

fn truncate_keeping_extension(name: &str, max: usize) -> String {
    if name.len() <= max {
        return name.to_string();
    }
    let ext = match name.rfind('.') {
        Some(dot) if name.len() - dot <= 16 => &name[dot..],
        _ => "",
    };
    let mut take = max - ext.len();
    while take > 0 && !name.is_char_boundary(take) {
        take -= 1;
    }
    format!("{}{}", &name[..take], ext)
}
