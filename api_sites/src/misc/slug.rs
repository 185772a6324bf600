use common::error::{AppError, Res};

const MIN_LEN: usize = 3;
const MAX_LEN: usize = 40;

/// Lowercase ASCII alphanumerics joined by single dashes.
/// `"Ada  Lovelace!"` becomes `"ada-lovelace"`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Slugs a requested username and checks its length.
pub fn username_from(input: &str) -> Res<String> {
    let slug = slugify(input);
    if !(MIN_LEN..=MAX_LEN).contains(&slug.len()) {
        return Err(AppError::BadRequest(format!(
            "Username must be {} to {} letters or digits",
            MIN_LEN, MAX_LEN
        )));
    }
    Ok(slug)
}
