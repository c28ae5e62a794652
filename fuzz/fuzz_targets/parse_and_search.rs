#![no_main]

use libfuzzer_sys::fuzz_target;

use astar::map::MapLayout;
use astar::search::SearchOutcome;
use astar::search::solve;

// Any text that parses into a layout must either yield a valid path or
// exhaust the frontier.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Keep instances small, the lists are scanned linearly.
    if text.len() > 4096 {
        return;
    }
    let Ok(layout) = MapLayout::try_from(text) else {
        return;
    };

    match solve(layout.grid(), layout.start(), layout.target()) {
        SearchOutcome::Found(path) => {
            assert!(path.is_valid_on(layout.grid()), "{path}");
            assert_eq!(path.start, layout.start());
            assert_eq!(path.end, layout.target());
        }
        SearchOutcome::Exhausted => {}
    }
});
