/// Splits `[0, len)` into `parts` consecutive half-open spans whose lengths
/// differ by at most one. The first `len % parts` spans take the extra unit.
///
/// `parts` must be in `1..=len`.
pub(crate) fn split_evenly(len: u32, parts: u32) -> Vec<(u32, u32)> {
    debug_assert!(parts >= 1 && parts <= len, "parts must be in 1..=len");
    let step = len / parts;
    let rem = len % parts;
    let mut start = 0;
    (0..parts)
        .map(|i| {
            let end = start + step + u32::from(i < rem);
            let span = (start, end);
            start = end;
            span
        })
        .collect()
}
