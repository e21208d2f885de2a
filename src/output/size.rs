/// Decimal unit steps as (power of ten, suffix), largest last
const UNITS: [(i32, &str); 4] = [(0, "B"), (3, "KB"), (6, "MB"), (9, "GB")];

/// Renders a byte count in decimal units
///
/// The unit is the largest one not exceeding the count; anything past a gigabyte
/// stays in GB. Zero renders as bytes.
///
/// # Examples
///
/// ```
/// use anime_harvest::format_size;
///
/// assert_eq!(format_size(1_536, 2), "1.54 KB");
/// assert_eq!(format_size(0, 2), "0.00 B");
/// ```
pub fn format_size(bytes: u64, decimals: usize) -> String {
    let digits = if bytes == 0 {
        0
    } else {
        bytes.ilog10() as i32
    };

    let (power, suffix) = UNITS
        .iter()
        .rev()
        .find(|(power, _)| *power <= digits)
        .copied()
        .unwrap_or(UNITS[0]);

    let scaled = bytes as f64 / 10f64.powi(power);
    format!("{:.*} {}", decimals, scaled, suffix)
}
