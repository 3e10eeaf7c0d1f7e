//! Fills three vectors with random numbers and measures each fill separately.
//!
//! Slot 0 covers the whole loop. Slots 1, 2 and 3 cover the three fills, handing over from
//! one to the next at a single counter reading, so their sum closely tracks slot 0.
//!
//! Run with: `cargo run --example tsc_timer_vectors`.

use std::hint::black_box;

use rand::Rng;
use tsc_timer::{Calibration, Label, TimeUnit, Timer};

const ROUNDS: usize = 100_000;
const VALUES_PER_ROUND: usize = 100;

fn main() {
    // Capture the calibration base point as early as possible for the most accurate scale.
    _ = Calibration::global();

    let mut timer = Timer::<4>::builder().unit(TimeUnit::Millis).build();

    let mut rng = rand::rng();

    let mut low = Vec::new();
    let mut middle = Vec::new();
    let mut high = Vec::new();

    timer.start(&[Label::Start(0)]);

    for _ in 0..ROUNDS {
        timer.start(&[Label::Start(0), Label::Start(1)]);
        for _ in 0..VALUES_PER_ROUND {
            low.push(rng.random_range(1..=100));
        }

        timer.start(&[Label::Start(0), Label::Stop(1), Label::Start(2)]);
        for _ in 0..VALUES_PER_ROUND {
            middle.push(rng.random_range(101..=200));
        }

        timer.start(&[Label::Start(0), Label::Stop(2), Label::Start(3)]);
        for _ in 0..VALUES_PER_ROUND {
            high.push(rng.random_range(201..=300));
        }

        timer.end(&[3]);
    }

    timer.end(&[0]);

    black_box((&low, &middle, &high));

    timer.print_to_stdout();

    let parts: f64 = (1..timer.slot_count())
        .map(|index| timer.get_in_unit(index))
        .sum();

    println!(
        "slots 1-3 cover {:.1}% of slot 0",
        parts / timer.get_in_unit(0) * 100.0
    );
}
