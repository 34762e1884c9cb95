use clap::Parser;
use clap::ValueEnum;
use probe_chain::HashFunction;
use probe_chain::HashTable;
use probe_chain::LinearProbingHashTable;
use probe_chain::SeparateChainingHashTable;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum HashChoice {
    Identity,
    Mix,
    Fnv,
    Fold,
}

impl HashChoice {
    fn function(self) -> HashFunction {
        match self {
            HashChoice::Identity => HashFunction::identity(),
            HashChoice::Mix => HashFunction::mix(),
            HashChoice::Fnv => HashFunction::fnv(),
            HashChoice::Fold => HashFunction::fold(),
        }
    }
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'n', long = "values", default_value_t = 1000)]
    values: i32,

    #[arg(long = "hash", value_enum, default_value_t = HashChoice::Mix)]
    hash: HashChoice,

    /// Remove every value divisible by this after filling.
    #[arg(short = 'r', long = "remove_every")]
    remove_every: Option<i32>,
}

fn fill(table: &mut dyn HashTable, args: &Args) {
    for value in 0..args.values {
        table.add(value);
    }
    if let Some(step) = args.remove_every.filter(|&step| step > 0) {
        for value in (0..args.values).filter(|value| value % step == 0) {
            table.remove(value);
        }
    }
}

fn main() {
    let args = Args::parse();

    println!(
        "Filling tables with {} values using {:?} hashing...",
        args.values, args.hash
    );

    let mut probing = LinearProbingHashTable::with_hasher(args.hash.function());
    fill(&mut probing, &args);
    println!();
    println!("--- linear probing ---");
    probing.print_probe_histogram();
    probing.debug_stats().print();

    let mut chaining = SeparateChainingHashTable::with_hasher(args.hash.function());
    fill(&mut chaining, &args);
    println!();
    println!("--- separate chaining ---");
    chaining.print_bucket_histogram();
    chaining.debug_stats().print();
}
