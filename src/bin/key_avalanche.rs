use clap::Parser;

use lib::{
    avalanche::{
        generate_counting, generate_random, generate_single_1_bit, key_flip_distances,
        key_sensitivity, message_sensitivity, AvalancheChart,
    },
    options::DEFAULT_KEY,
};

struct Target<'a> {
    name: &'a str,
    compute: &'a dyn Fn(usize) -> AvalancheChart,

    /// Number of rounds to run with. Zero is treated specially, and means to
    /// use the default number of rounds from the command line.
    rounds: usize,
}

const TARGETS: &[Target] = &[
    Target {
        name: "key bits, empty message",
        compute: &|rounds| key_sensitivity(b"", rounds),
        rounds: 0,
    },
    Target {
        name: "key bits, short title",
        compute: &|rounds| key_sensitivity(b"identicons are great!", rounds),
        rounds: 0,
    },
    Target {
        name: "message bits, random 8 bytes",
        compute: &|rounds| message_sensitivity(&DEFAULT_KEY, 8, &generate_random, rounds),
        rounds: 0,
    },
    Target {
        name: "message bits, random 21 bytes",
        compute: &|rounds| message_sensitivity(&DEFAULT_KEY, 21, &generate_random, rounds),
        rounds: 0,
    },
    Target {
        name: "message bits, counting 16 bytes",
        compute: &|rounds| message_sensitivity(&DEFAULT_KEY, 16, &generate_counting, rounds),
        rounds: 0,
    },
    Target {
        name: "message bits, single-bit 16 bytes",
        compute: &|rounds| message_sensitivity(&DEFAULT_KEY, 16, &generate_single_1_bit, rounds),

        // NOTE: there are only 128 distinct single-bit inputs, so more rounds
        // just repeat them.
        rounds: 128,
    },
];

/// Avalanche report for SipHash-2-4 under key and message bit flips.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Only run targets whose name contains one of these (case-insensitive)
    filters: Vec<String>,

    /// Rounds per target, at least 1
    #[arg(
        short,
        long,
        default_value_t = 1 << 12,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    rounds: usize,

    /// Write each avalanche chart to "<target>.png"
    #[arg(long)]
    png: bool,

    /// Also print the Hamming distance histogram for key bit flips
    #[arg(long)]
    histogram: bool,
}

fn main() -> std::io::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let name_filters: Vec<String> = args.filters.iter().map(|f| f.to_lowercase()).collect();

    for target in TARGETS.iter() {
        if !name_filters.is_empty() {
            let lower_name = target.name.to_lowercase();

            if !name_filters
                .iter()
                .any(|filter| lower_name.contains(filter))
            {
                continue;
            }
        }

        println!("\n================================");
        println!("{}", target.name);

        let rounds = if target.rounds == 0 {
            args.rounds
        } else {
            target.rounds
        };
        let chart = (target.compute)(rounds);
        chart.print_report();

        if args.png {
            chart.write_png(format!("{}.png", target.name))?;
        }
    }

    if args.histogram {
        println!("\n================================");
        println!("key bit flips, title \"test\"");
        key_flip_distances(b"test", args.rounds).print_report();
    }

    Ok(())
}
