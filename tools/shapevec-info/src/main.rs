//! shapevec-info - inspect vector species and check the active backend.
//!
//! `species` lists every species the host supports, `platform` shows the
//! detected CPU and the widths chosen from it, and `verify` runs random
//! operands through the active backend and the scalar fallback and fails
//! if they ever disagree.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use shapevec::dispatch::{self, Backend};
use shapevec::platform;
use shapevec::{Lane, LaneKind, Operator, Species, VectorShape};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Inspect shapevec species and backends
#[derive(Parser, Debug)]
#[command(name = "shapevec-info")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The command to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Subcommands
#[derive(Subcommand, Debug)]
enum Commands {
    /// List the supported species
    Species {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the detected platform and vector widths
    Platform {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Compare the active backend with the scalar fallback
    Verify {
        /// Random operand pairs per operator and species
        #[arg(long, default_value = "64")]
        rounds: u32,

        /// Seed for the operand generator
        #[arg(long, default_value = "12345")]
        seed: u64,
    },
}

#[derive(Serialize)]
struct SpeciesRow {
    name: String,
    kind: LaneKind,
    shape: VectorShape,
    bits: u32,
    lane_count: usize,
}

#[derive(Serialize)]
struct PlatformReport<'a> {
    target: &'a shapevec_target::TargetSpec,
    max_bits: u32,
    preferred: VectorShape,
    widths: Vec<(LaneKind, u32)>,
    backend: &'static str,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Species { json } => list_species(json),
        Commands::Platform { json } => show_platform(json),
        Commands::Verify { rounds, seed } => verify(rounds, seed),
    }
}

fn list_species(json: bool) -> Result<()> {
    let rows: Vec<SpeciesRow> = Species::all()
        .map(|s| SpeciesRow {
            name: s.to_string(),
            kind: s.kind(),
            shape: s.shape(),
            bits: s.vector_bit_size(),
            lane_count: s.lane_count(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    println!("{:<24} {:>6} {:>6}", "SPECIES", "BITS", "LANES");
    for row in &rows {
        println!("{:<24} {:>6} {:>6}", row.name, row.bits, row.lane_count);
    }
    Ok(())
}

fn show_platform(json: bool) -> Result<()> {
    let profile = platform::profile();
    let backend = dispatch::backend();
    let report = PlatformReport {
        target: profile.target(),
        max_bits: profile.max_bits(),
        preferred: profile.preferred(),
        widths: LaneKind::ALL
            .iter()
            .map(|&kind| (kind, profile.max_bits_for(kind)))
            .collect(),
        backend: backend.name(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("target:    {}", report.target);
    println!("max bits:  {}", report.max_bits);
    println!("preferred: {}", report.preferred);
    println!("backend:   {}", report.backend);
    for (kind, bits) in &report.widths {
        println!("  {kind:<4} up to {bits} bits");
    }
    Ok(())
}

/// xorshift128+ operand generator.
struct Operands {
    state: [u64; 2],
}

impl Operands {
    fn from_seed(seed: u64) -> Self {
        let mut x = seed;
        let mut state = [0u64; 2];
        for word in &mut state {
            x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
            let mut z = x;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            *word = z ^ (z >> 31);
        }
        if state == [0, 0] {
            state[0] = 1;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        let mut s1 = self.state[0];
        let s0 = self.state[1];
        let result = s0.wrapping_add(s1);
        self.state[0] = s0;
        s1 ^= s1 << 23;
        self.state[1] = s1 ^ s0 ^ (s1 >> 18) ^ (s0 >> 5);
        result
    }

    /// Random bits for integral lanes, small finite values for floats.
    #[allow(clippy::cast_possible_wrap)]
    fn lanes<E: Lane>(&mut self, n: usize) -> Vec<E> {
        (0..n)
            .map(|_| {
                let raw = self.next_u64();
                if E::KIND.is_floating() {
                    E::from_i64((raw % 2_000_001) as i64 - 1_000_000).lane_div(E::from_i64(64))
                } else {
                    E::from_bits(raw)
                }
            })
            .collect()
    }
}

#[derive(Default)]
struct Tally {
    accepted: u64,
    declined: u64,
    mismatched: Vec<String>,
}

fn verify_kind<E: Lane>(backend: &dyn Backend, rng: &mut Operands, rounds: u32, tally: &mut Tally) -> Result<()> {
    let ops: &[Operator] = if E::KIND.is_floating() {
        &[Operator::Add, Operator::Sub, Operator::Mul, Operator::Div]
    } else {
        &[Operator::Add, Operator::Sub, Operator::And, Operator::Or, Operator::Xor]
    };
    for shape in VectorShape::ALL {
        let Ok(species) = Species::resolve(E::KIND, shape) else {
            continue;
        };
        for &op in ops {
            for _ in 0..rounds {
                let a = rng.lanes::<E>(species.lane_count());
                let b = rng.lanes::<E>(species.lane_count());
                match dispatch::verify_binary(backend, op, species, &a, &b)? {
                    Some(true) => tally.accepted += 1,
                    Some(false) => {
                        tally.mismatched.push(format!("{op} on {species}"));
                        break;
                    }
                    None => tally.declined += 1,
                }
            }
        }
    }
    Ok(())
}

fn verify(rounds: u32, seed: u64) -> Result<()> {
    let backend = dispatch::backend();
    tracing::info!(backend = backend.name(), rounds, seed, "verifying backend");

    let mut rng = Operands::from_seed(seed);
    let mut tally = Tally::default();
    verify_kind::<i8>(backend.as_ref(), &mut rng, rounds, &mut tally)?;
    verify_kind::<i16>(backend.as_ref(), &mut rng, rounds, &mut tally)?;
    verify_kind::<i32>(backend.as_ref(), &mut rng, rounds, &mut tally)?;
    verify_kind::<i64>(backend.as_ref(), &mut rng, rounds, &mut tally)?;
    verify_kind::<f32>(backend.as_ref(), &mut rng, rounds, &mut tally)?;
    verify_kind::<f64>(backend.as_ref(), &mut rng, rounds, &mut tally)?;

    println!(
        "{}: {} accepted, {} declined, {} mismatched",
        backend.name(),
        tally.accepted,
        tally.declined,
        tally.mismatched.len()
    );
    if !tally.mismatched.is_empty() {
        for case in &tally.mismatched {
            tracing::error!("{case}");
        }
        bail!("backend {} disagrees with the scalar fallback", backend.name());
    }
    Ok(())
}
