use clap::Parser;
use rex_slew_scan::{run, Args, ManeuverConfig, SpiceProvider};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let Some(invocation) = args.invocation() else {
        return Ok(());
    };

    let mut provider = SpiceProvider::new();
    run(
        &mut provider,
        &ManeuverConfig::default(),
        &invocation,
        std::io::stdout().lock(),
    )?;
    Ok(())
}
