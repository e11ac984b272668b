#![forbid(unsafe_code)]

//! Scripted walkthrough of the visibility multiplexer against the simulated
//! host: three cards scroll into view, dispatch is paused and resumed, and
//! the instance is torn down. Run with `cargo run -p inview-demo`.

use std::time::Duration;

use inview::sim::SimHost;
use inview::{Config, EventKind, InView, Precision};
use tracing::info;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .without_time()
        .init();

    let host = SimHost::new();
    let cards: Vec<_> = (0..3).map(|_| host.add_element(".card")).collect();

    let mut inview = InView::new(
        host.clone(),
        Config::new(".card")
            .precision(Precision::Low)
            .delay(Duration::from_millis(120)),
    );
    inview
        .on(EventKind::Enter, |event| {
            info!(card = %event.target.id(), "enter at {:.0}%", event.percentage);
        })
        .on(EventKind::Exit, |event| {
            info!(card = %event.target.id(), "exit");
        });

    // Scroll the first two cards in over four steps; the per-target debounce
    // folds each burst into a single callback carrying the last ratio.
    for step in 1..=4u32 {
        let ratio = f64::from(step) * 0.25;
        host.deliver(&cards[0], ratio);
        host.deliver(&cards[1], ratio / 2.0);
        host.advance(30.0);
    }
    host.advance(200.0);

    // The third card appears while paused: observed, never dispatched.
    inview.pause();
    host.deliver(&cards[2], 1.0);
    host.advance(200.0);
    inview.resume();
    host.deliver(&cards[2], 0.8);
    host.advance(200.0);

    // Everything scrolls out; with a zero delay the exits land synchronously.
    inview.set_delay(Duration::ZERO);
    for card in &cards {
        host.deliver(card, 0.0);
    }

    inview.destroy();
    info!(clock_ms = host.now_ms(), "demo finished");
}
