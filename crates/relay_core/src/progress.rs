pub const DEFAULT_BAR_WIDTH: usize = 50;
const FILL: char = '█';
const EMPTY: char = '-';

/// Renders `|████------| 40.0%` for `done` out of `total`.
///
/// A zero total renders as complete. `done` beyond `total` is clamped.
pub fn render_progress_bar(done: usize, total: usize, width: usize) -> String {
    let (filled, percent) = if total == 0 {
        (width, 100.0)
    } else {
        let done = done.min(total);
        (width * done / total, 100.0 * done as f64 / total as f64)
    };
    let mut bar = String::with_capacity(width * FILL.len_utf8() + 12);
    bar.push('|');
    bar.extend(std::iter::repeat(FILL).take(filled));
    bar.extend(std::iter::repeat(EMPTY).take(width - filled));
    bar.push('|');
    bar.push_str(&format!(" {percent:.1}%"));
    bar
}
