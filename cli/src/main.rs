#[macro_use]
extern crate log;

use structopt::StructOpt;

use streets2sidewalks::{io, Config};

#[derive(StructOpt)]
#[structopt(
    name = "streets2sidewalks",
    about = "Turns street centerlines with per-side sidewalk offsets into a sidewalk network"
)]
struct Args {
    /// A GeoJSON FeatureCollection of LineString streets with id, sw_left and sw_right
    /// properties
    #[structopt()]
    infile: String,
    /// Where to write the resulting sidewalks
    #[structopt()]
    outfile: String,
    /// The output format; only GeoJSON is supported
    #[structopt(long, default_value = "GeoJSON")]
    driver: String,
    /// Decimal places used to merge street endpoints into shared intersection nodes
    #[structopt(long, default_value = "1")]
    precision: i32,
}

fn main() {
    // Adjust the log level with RUST_LOG, e.g. RUST_LOG=debug
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run(Args::from_args()) {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let cfg = Config {
        precision: args.precision,
        ..Config::default()
    };

    let (streets, foreign_members) = io::read_streets(&args.infile)?;
    info!("Read {} streets from {}", streets.len(), args.infile);

    let sidewalks = streets2sidewalks::streets_to_sidewalks(streets, &cfg);
    info!("Drew {} sidewalks", sidewalks.len());

    io::write_sidewalks(&args.outfile, sidewalks, &args.driver, foreign_members)?;
    info!("Wrote {}", args.outfile);
    Ok(())
}
