#![doc = include_str!("../README.md")]

use std::time::Instant;

use clap::Parser;
use dac::Dac;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Directly addressable codes benchmark.
struct Conf {
    /// The number of values to generate.
    #[arg(short = 'n', long, default_value_t = 1_000_000)]
    num: usize,

    /// Maximum bit-length a generated value may reach; the distribution of
    /// bit-lengths actually used is right-skewed towards small values.
    #[arg(short = 'm', long, default_value_t = 48)]
    max_bits: u32,

    /// The rank-overhead constant passed to the builder.
    #[arg(short = 'x', long, default_value_t = 0.05)]
    x: f64,

    /// Seed for the random generator.
    #[arg(short = 's', long, default_value_t = 0x5EED)]
    seed: u64,

    /// Whether to verify every value round-trips after building.
    #[arg(short = 'v', long, default_value_t = true)]
    verify: bool,
}

/// Draws a bit-length skewed towards 0, then a uniformly random value of
/// that bit-length.
fn right_skewed_value(rng: &mut SmallRng, max_bits: u32) -> u64 {
    let skewed_bits = (rng.random::<f64>().powi(3) * max_bits as f64) as u32;
    if skewed_bits == 0 {
        return rng.random_range(0..=1);
    }
    let lo = 1u64 << (skewed_bits - 1);
    let hi = (1u64 << skewed_bits) - 1;
    rng.random_range(lo..=hi)
}

fn main() {
    let conf = Conf::parse();
    let mut rng = SmallRng::seed_from_u64(conf.seed);

    println!("dac: generating {} right-skewed values (max {} bits)", conf.num, conf.max_bits);
    let values: Vec<u64> = (0..conf.num).map(|_| right_skewed_value(&mut rng, conf.max_bits)).collect();

    let start = Instant::now();
    let dac = Dac::build(values.iter().copied(), conf.x).expect("failed to build Dac");
    let build_seconds = start.elapsed().as_secs_f64();

    println!("  build time: {build_seconds:.3} s");
    println!("  levels: {}  widths: {:?}", dac.levels(), dac.block_sizes());
    println!(
        "  bit_length: {:.0}  ({:.3} bits/item)",
        dac.bit_length(),
        dac.bit_length() / conf.num as f64
    );
    let ratios = dac.compression_ratios();
    let savings = dac.space_savings();
    println!("  ratio vs vbyte: {:.3}  (savings {:.1}%)", ratios.vbyte, savings.vbyte * 100.0);
    println!(
        "  ratio vs fixed_width: {:.3}  (savings {:.1}%)",
        ratios.fixed_width,
        savings.fixed_width * 100.0
    );

    if conf.verify {
        let start = Instant::now();
        for (k, &v) in values.iter().enumerate() {
            assert_eq!(dac.at(k).unwrap(), v, "wrong value at index {k}");
        }
        let access_seconds = start.elapsed().as_secs_f64();
        println!(
            "  verification: DONE ({:.2} ns/item)",
            access_seconds * 1e9 / conf.num as f64
        );
    }
}
