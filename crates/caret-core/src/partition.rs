//! Search-range partitioning.
//!
//! Every caret gets a raw range from its selection, its line or its scan direction. The raw
//! ranges are then clipped against their neighbours in scan order, so that no two carets can
//! ever match the same text.

use crate::caret::Caret;
use crate::host::CaretHost;
use crate::pattern::Direction;
use crate::policy::SearchPolicy;
use crate::range::TextRange;

/// Unclipped range one caret would search on its own.
pub fn raw_range<H: CaretHost + ?Sized>(host: &H, caret: &Caret, policy: &SearchPolicy) -> TextRange {
    if let Some(selection) = caret.selection.filter(|s| !s.is_empty()) {
        return selection;
    }

    let offset = caret.offset.min(host.len_chars());
    let line = host.line_of(offset);
    if policy.line_mode {
        return TextRange::new(host.line_start(line), host.line_end(line).max(offset));
    }

    match policy.direction {
        Direction::Forward if policy.single_line => {
            TextRange::new(offset, host.line_end(line).max(offset))
        }
        Direction::Forward => TextRange::new(offset, host.len_chars()),
        Direction::Backward if policy.single_line => {
            TextRange::new(host.line_start(line).min(offset), offset)
        }
        Direction::Backward => TextRange::new(0, offset),
    }
}

/// Non-overlapping search ranges for `carets`, aligned with the input.
///
/// `None` marks a caret dropped from this invocation because its range came out empty and
/// `policy.want_empty_ranges` is off.
pub fn partition<H: CaretHost + ?Sized>(
    host: &H,
    carets: &[Caret],
    policy: &SearchPolicy,
) -> Vec<Option<TextRange>> {
    let raw: Vec<TextRange> = carets.iter().map(|c| raw_range(host, c, policy)).collect();
    let clipped = match policy.direction {
        Direction::Forward => clip_forward(carets, &raw),
        Direction::Backward => clip_backward(carets, &raw),
    };

    clipped
        .into_iter()
        .map(|range| (policy.want_empty_ranges || !range.is_empty()).then_some(range))
        .collect()
}

/// The part of a caret's partitioned `range` actually scanned.
///
/// A caret without a selection scans away from its own offset: forward from
/// `max(range.start, offset)`, backward up to `min(range.end, offset)`. A line-mode range
/// therefore never yields matches behind the caret. Selections are scanned whole.
pub fn scan_range(caret: &Caret, range: TextRange, direction: Direction) -> TextRange {
    if caret.has_selection() {
        return range;
    }
    match direction {
        Direction::Forward => range.with_start(range.start.max(caret.offset)),
        Direction::Backward => range.with_end(range.end.min(caret.offset)),
    }
}

/// Sweep left to right; each range ends where the next one starts, or at the next caret
/// when both ranges start together.
fn clip_forward(carets: &[Caret], raw: &[TextRange]) -> Vec<TextRange> {
    let mut order: Vec<usize> = (0..carets.len()).collect();
    order.sort_by_key(|&i| (raw[i].start, carets[i].offset, i));

    let mut clipped = raw.to_vec();
    let mut floor = 0;
    for (k, &i) in order.iter().enumerate() {
        let start = raw[i].start.max(floor);
        let mut end = raw[i].end;
        if let Some(&j) = order.get(k + 1) {
            let cut = if raw[j].start > start {
                raw[j].start
            } else {
                carets[j].offset.max(start)
            };
            end = end.min(cut);
        }
        let end = end.max(start);
        clipped[i] = TextRange::new(start, end);
        floor = end;
    }
    clipped
}

/// Mirror image of [`clip_forward`]: sweep right to left.
fn clip_backward(carets: &[Caret], raw: &[TextRange]) -> Vec<TextRange> {
    let mut order: Vec<usize> = (0..carets.len()).collect();
    order.sort_by_key(|&i| {
        (
            std::cmp::Reverse(raw[i].end),
            std::cmp::Reverse(carets[i].offset),
            i,
        )
    });

    let mut clipped = raw.to_vec();
    let mut ceiling = usize::MAX;
    for (k, &i) in order.iter().enumerate() {
        let end = raw[i].end.min(ceiling);
        let mut start = raw[i].start;
        if let Some(&j) = order.get(k + 1) {
            let cut = if raw[j].end < end {
                raw[j].end
            } else {
                carets[j].offset.min(end)
            };
            start = start.max(cut);
        }
        let start = start.min(end);
        clipped[i] = TextRange::new(start, end);
        ceiling = start;
    }
    clipped
}
