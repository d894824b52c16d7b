//! Ordering of historical photos, derived from their archive filenames.

/// Sort position for historical photos whose filename carries no number.
pub const DEFAULT_DISPLAY_ORDER: i32 = 999;

/// Image extensions accepted by the historical backfill.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Returns true if the filename ends in one of [`IMAGE_EXTENSIONS`] (case-insensitive).
pub fn is_image_file(filename: &str) -> bool {
    image_extension(filename).is_some()
}

fn image_extension(filename: &str) -> Option<&str> {
    let (_, ext) = filename.rsplit_once('.')?;
    IMAGE_EXTENSIONS
        .iter()
        .any(|known| ext.eq_ignore_ascii_case(known))
        .then_some(ext)
}

/// Derive a display order from the first run of digits in a filename.
///
/// `"01.jpeg"` → 1, `"IMG_0042.jpg"` → 42, `"photo-5.jpeg"` → 5,
/// `"noNumber.png"` → [`DEFAULT_DISPLAY_ORDER`]. Digits in the extension are ignored.
pub fn extract_display_order(filename: &str) -> i32 {
    let stem = match image_extension(filename) {
        Some(ext) => &filename[..filename.len() - ext.len() - 1],
        None => filename,
    };

    let digits: String = stem
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return DEFAULT_DISPLAY_ORDER;
    }

    digits.parse().unwrap_or(i32::MAX)
}
