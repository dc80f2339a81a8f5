/// Derive the output filename: the text after the last `.` becomes `jpg`.
///
/// Names without a dot get `.jpg` appended. Path separators are not
/// special, so `"dir.v2/scan"` becomes `"dir.jpg"`; callers pass bare names.
pub fn jpeg_filename(name: &str) -> String {
    let stem = match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name,
    };
    format!("{}.jpg", stem)
}
