use boxpack_core::Packer;
use rand::{Rng, SeedableRng};
use std::time::Instant;

fn run(n: usize, side: f64, seed: u64) {
    let mut packer: Packer<String> = Packer::new(side, side);
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    for i in 0..n {
        let w = rng.gen_range(4.0..=96.0);
        let h = rng.gen_range(4.0..=96.0);
        packer.add_box(w, h, format!("r{}", i));
    }

    let start = Instant::now();
    packer.pack();
    let elapsed = start.elapsed();
    let stats = packer.stats();
    println!(
        "n={} container={}x{} placed={} unplaced={} fullness={:.2}% free_rects={} time={}ms",
        n,
        side,
        side,
        stats.placed,
        stats.unplaced,
        stats.fullness * 100.0,
        packer.free_count(),
        elapsed.as_millis()
    );
}

fn main() {
    println!("N=200");
    run(200, 1024.0, 1337);

    println!("\nN=1000");
    run(1000, 2048.0, 4242);
}
