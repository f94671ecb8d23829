use anyhow::Result;
use clap::Parser;
use dds_model::{
    args::LutArgs,
    lut::{Encoding, SineLut},
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let args = LutArgs::parse();
    let lut = SineLut::generate(args.phase_dw, args.out_dw)?;
    let encodings: &[Encoding] = match args.use_lut_file {
        Some(true) => &[Encoding::MemInit],
        Some(false) => &[Encoding::Literal],
        None => &[Encoding::MemInit, Encoding::Literal],
    };
    for &encoding in encodings {
        lut.write_file(&args.filename, encoding)?;
    }
    Ok(())
}
