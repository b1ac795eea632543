use doublecount::{fixture, Alphabet, Driver, MeasureConfig};
use std::time::Duration;

fn run_case(driver: &Driver, length: usize, alphabet_size: usize) {
    let alphabet = Alphabet::first_n(alphabet_size);
    let input = fixture::generate(42, length, &alphabet);

    let (reports, mismatch) = driver.run(&input);
    for r in &reports {
        match (&r.stats, r.result) {
            (Some(s), Some(result)) => println!(
                "LEN={} ALPHA={} variant={} result={} mean={:?} stddev={:?} min={:?} max={:?} samples={}",
                length, alphabet_size, r.name, result, s.mean, s.stddev, s.min, s.max, s.samples
            ),
            _ => println!(
                "LEN={} ALPHA={} variant={} error={}",
                length,
                alphabet_size,
                r.name,
                r.error.as_ref().map(|e| e.to_string()).unwrap_or_default()
            ),
        }
    }
    if let Some(m) = mismatch {
        println!("LEN={} ALPHA={} MISMATCH {}", length, alphabet_size, m);
    }
}

fn main() {
    let _ = tracing_subscriber::fmt().with_writer(std::io::stderr).try_init();

    let measure = MeasureConfig {
        min_duration: Duration::from_millis(200),
        ..MeasureConfig::default()
    };
    let driver = match Driver::with_default_counters(measure) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };

    let lengths = [1_000usize, 10_000, 100_000, 1_000_000];
    let alphabet_sizes = [1usize, 2, 4, 26, 52];
    for &length in &lengths {
        for &size in &alphabet_sizes {
            run_case(&driver, length, size);
        }
    }
}
